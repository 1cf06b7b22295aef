//! Embedded demo dataset.
//!
//! Same shape as the tracking spreadsheet (localized, padded labels included)
//! so the whole pipeline can be exercised offline.

use crate::data::source::SourceDescriptor;

pub const DEMO_NAME: &str = "demo";

pub const DEMO_TABLE: &str = "\
Data, Peso, Calorias, Proteinas, Agua, Fibras, Carbos
14/01, 71.40, 1890, 98.0, 2100, 14.0, 182
15/01, 71.05, 1760, 104.5, 2450, 18.5, 171
16/01, 70.60, 1710, 120.2, 2800, 21.0, 160
17/01, 70.35, 1695, 118.7, 2950, 19.5, 155
18/01, 69.90, 1640, 111.3, 3210, 12.5, 148
";

pub fn demo_source() -> SourceDescriptor {
    SourceDescriptor::inline(DEMO_NAME, DEMO_TABLE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::source::parse_table;

    #[test]
    fn demo_table_parses_with_localized_header() {
        let table = parse_table(DEMO_TABLE).unwrap();
        assert_eq!(
            table.headers,
            vec!["Data", "Peso", "Calorias", "Proteinas", "Agua", "Fibras", "Carbos"]
        );
        assert_eq!(table.rows.len(), 5);
        assert_eq!(table.rows[4][0], "18/01");
    }
}
