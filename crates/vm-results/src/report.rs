//! Plain-text tables over a finished run.
//!
//! Every table is written into a caller-supplied buffer; the `String`
//! helpers exist so a front-end can drop the text straight into a widget.
//! Number formatting follows what users of the Python tooling are used to
//! reading (two-digit signed exponents, units after each value).

use std::fmt::{self, Write};

use crate::types::{ApertureRecovery, VectorialResult};

pub fn write_radial_density(out: &mut impl Write, result: &VectorialResult) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "Radius (km) vs Fragment density (1/cm3)")?;
    writeln!(out, "---------------------------------------")?;
    for (r, n_r) in result
        .volume_density_grid_km
        .iter()
        .zip(&result.volume_density_per_cm3)
    {
        writeln!(out, "{r:10.1} km : {n_r:8.4} 1 / cm3")?;
    }
    Ok(())
}

pub fn write_column_density(out: &mut impl Write, result: &VectorialResult) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "Radius (km) vs Column density (1/cm2)")?;
    writeln!(out, "-------------------------------------")?;
    for (r, cd) in result
        .column_density_grid_km
        .iter()
        .zip(&result.column_density_per_cm2)
    {
        writeln!(out, "{r:7.0} km :\t{} 1 / cm2", sci(*cd, 3))?;
    }
    Ok(())
}

pub fn write_agreement_check(out: &mut impl Write, result: &VectorialResult) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "Fragment agreement check:")?;
    writeln!(
        out,
        "\tTheoretical total number of fragments in coma:\t {}",
        sci(result.num_fragments_theory, 7)
    )?;
    writeln!(
        out,
        "\tTotal number of fragments from density grid integration:\t {}",
        sci(result.num_fragments_grid, 7)
    )
}

pub fn write_aperture_check(out: &mut impl Write, recovery: &ApertureRecovery) -> fmt::Result {
    writeln!(out)?;
    writeln!(
        out,
        "Percent of fragments recovered by integrating column density over"
    )?;
    writeln!(
        out,
        "\tLarge circular aperture:\t{:2.2}%",
        recovery.circular_percent()
    )?;
    writeln!(
        out,
        "\tAnnular aperture, inner radius 500000 km, outer radius of entire grid:\t{:2.2}%",
        recovery.annular_percent()
    )
}

pub fn radial_density_table(result: &VectorialResult) -> String {
    capture(|out| write_radial_density(out, result))
}

pub fn column_density_table(result: &VectorialResult) -> String {
    capture(|out| write_column_density(out, result))
}

pub fn agreement_check(result: &VectorialResult) -> String {
    capture(|out| write_agreement_check(out, result))
}

pub fn aperture_check(recovery: &ApertureRecovery) -> String {
    capture(|out| write_aperture_check(out, recovery))
}

fn capture(write: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut buf = String::new();
    // Writing into a String cannot fail.
    let _ = write(&mut buf);
    buf
}

/// Scientific notation with a signed, at least two-digit exponent (`1.234e+05`).
fn sci(value: f64, precision: usize) -> String {
    let raw = format!("{value:.precision$e}");
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> VectorialResult {
        VectorialResult {
            volume_density_grid_km: vec![1234.56, 20000.0],
            volume_density_per_cm3: vec![0.123456, 0.00001],
            column_density_grid_km: vec![1000.0, 250000.4],
            column_density_per_cm2: vec![12345.678, 3.2e-7],
            num_fragments_theory: 1.23456789e28,
            num_fragments_grid: 1.2e28,
            max_grid_radius_m: 2.5e9,
        }
    }

    #[test]
    fn sci_matches_python_exponents() {
        assert_eq!(sci(12345.678, 3), "1.235e+04");
        assert_eq!(sci(3.2e-7, 3), "3.200e-07");
        assert_eq!(sci(1.23456789e28, 7), "1.2345679e+28");
        assert_eq!(sci(1.0e100, 1), "1.0e+100");
        assert_eq!(sci(0.0, 2), "0.00e+00");
    }

    #[test]
    fn radial_table_layout() {
        let text = radial_density_table(&result());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "Radius (km) vs Fragment density (1/cm3)");
        assert_eq!(lines[3], "    1234.6 km :   0.1235 1 / cm3");
        assert_eq!(lines[4], "   20000.0 km :   0.0000 1 / cm3");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn column_table_layout() {
        let text = column_density_table(&result());
        assert!(text.contains("   1000 km :\t1.235e+04 1 / cm2\n"));
        assert!(text.contains(" 250000 km :\t3.200e-07 1 / cm2\n"));
    }

    #[test]
    fn agreement_lines() {
        let text = agreement_check(&result());
        assert!(text.starts_with("\nFragment agreement check:\n"));
        assert!(text.contains("in coma:\t 1.2345679e+28\n"));
        assert!(text.contains("integration:\t 1.2000000e+28\n"));
    }

    #[test]
    fn aperture_percentages() {
        let text = aperture_check(&ApertureRecovery {
            fragments_theory: 400.0,
            circular_total: 398.0,
            annular_total: 13.0,
        });
        assert!(text.contains("Large circular aperture:\t99.50%\n"));
        assert!(text.ends_with("entire grid:\t3.25%\n"));
    }
}
