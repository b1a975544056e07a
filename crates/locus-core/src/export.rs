use crate::error::LocusError;
use crate::types::Dataset;

/// Download name offered for the exported table.
pub const CSV_FILENAME: &str = "eqtl_results.csv";

/// Placeholder for absent optional fields, matching the results table.
const MISSING: &str = "N/A";

const HEADER: [&str; 8] = [
    "Variant ID",
    "RSID",
    "Gene ID",
    "Gene Name",
    "P-value",
    "Beta",
    "SE",
    "Position",
];

/// Serialize the held dataset in its original (unsorted) fetch order.
/// P-values use scientific notation with a 2-decimal mantissa; beta and SE
/// are fixed to 3 decimals.
pub fn dataset_to_csv(dataset: &Dataset) -> Result<String, LocusError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for rec in dataset.records() {
        writer.write_record(&[
            rec.variant.variant_id.clone(),
            rec.variant.rsid.clone().unwrap_or_else(|| MISSING.to_string()),
            rec.gene.gene_id.clone(),
            rec.gene.gene_name.clone().unwrap_or_else(|| MISSING.to_string()),
            format_exponential(rec.pvalue, 2),
            format!("{:.3}", rec.beta),
            format!("{:.3}", rec.se),
            rec.variant.position.to_string(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| LocusError::Csv(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Scientific notation with `digits` places after the mantissa's decimal
/// point: 0.0001234 → "1.23e-4". Matches the browser's
/// `Number.toExponential(digits)` down to the explicit `+` on
/// non-negative exponents.
pub fn format_exponential(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return format!("{:.*}e+0", digits, 0.0);
    }
    let negative = value < 0.0;
    let mut exponent = value.abs().log10().floor() as i32;
    let mut mantissa = value.abs() / 10f64.powi(exponent);
    // Rounding at `digits` places can carry the mantissa to 10.
    let factor = 10f64.powi(digits as i32);
    mantissa = (mantissa * factor).round() / factor;
    if mantissa >= 10.0 {
        mantissa /= 10.0;
        exponent += 1;
    }
    format!(
        "{}{:.*}e{}{}",
        if negative { "-" } else { "" },
        digits,
        mantissa,
        if exponent < 0 { "-" } else { "+" },
        exponent.abs()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssociationRecord, GeneInfo, VariantInfo};

    fn record(
        id: &str,
        rsid: Option<&str>,
        gene_name: Option<&str>,
        position: i64,
        pvalue: f64,
        beta: f64,
        se: f64,
    ) -> AssociationRecord {
        AssociationRecord {
            variant: VariantInfo {
                variant_id: id.to_string(),
                rsid: rsid.map(str::to_string),
                position,
            },
            gene: GeneInfo {
                gene_id: "ENSG00000141510".to_string(),
                gene_name: gene_name.map(str::to_string),
            },
            pvalue,
            beta,
            se,
        }
    }

    #[test]
    fn test_format_exponential() {
        assert_eq!(format_exponential(0.0001234, 2), "1.23e-4");
        assert_eq!(format_exponential(0.05, 2), "5.00e-2");
        assert_eq!(format_exponential(1.0, 2), "1.00e+0");
        assert_eq!(format_exponential(1e-8, 2), "1.00e-8");
        assert_eq!(format_exponential(0.0, 2), "0.00e+0");
        assert_eq!(format_exponential(-0.0042, 2), "-4.20e-3");
    }

    #[test]
    fn test_format_exponential_carries_rounding() {
        // 0.999999 rounds up into the next exponent.
        assert_eq!(format_exponential(0.999999, 2), "1.00e+0");
        assert_eq!(format_exponential(0.0999999, 2), "1.00e-1");
    }

    #[test]
    fn test_csv_three_records() {
        let ds = Dataset::new(vec![
            record(
                "chr17_7578406_C_T",
                Some("rs1042522"),
                Some("TP53"),
                7_578_406,
                0.0001234,
                0.12345,
                0.045,
            ),
            record("chr17_7579000_G_A", None, None, 7_579_000, 0.05, -0.2, 0.1),
            record(
                "chr17_7580000_T_C",
                Some("rs17880604"),
                Some("TP53"),
                7_580_000,
                1e-8,
                1.5,
                0.25,
            ),
        ]);
        let csv = dataset_to_csv(&ds).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "Variant ID,RSID,Gene ID,Gene Name,P-value,Beta,SE,Position"
        );
        assert_eq!(
            lines[1],
            "chr17_7578406_C_T,rs1042522,ENSG00000141510,TP53,1.23e-4,0.123,0.045,7578406"
        );
        assert_eq!(
            lines[2],
            "chr17_7579000_G_A,N/A,ENSG00000141510,N/A,5.00e-2,-0.200,0.100,7579000"
        );
        assert_eq!(
            lines[3],
            "chr17_7580000_T_C,rs17880604,ENSG00000141510,TP53,1.00e-8,1.500,0.250,7580000"
        );
    }

    #[test]
    fn test_csv_empty_dataset_is_header_only() {
        let csv = dataset_to_csv(&Dataset::default()).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
