//! Downloadable import template in the "new" column layout.

use super::CSV_DELIMITER;

/// Header row of the template.
pub const TEMPLATE_HEADERS: [&str; 9] = [
    "Disciplina",
    "Frente",
    "Módulo",
    "Nome do Módulo",
    "Aula",
    "Nome da Aula",
    "Tempo",
    "Prioridade",
    "Importância",
];

const EXAMPLE_ROW: [&str; 9] = [
    "Física",
    "Frente A",
    "1",
    "Cinemática",
    "1",
    "Movimento Uniforme",
    "00:15:00",
    "3",
    "Alta",
];

/// Template CSV: headers plus one example row, `;`-separated.
pub fn template_csv() -> String {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(CSV_DELIMITER)
        .from_writer(Vec::new());

    writer
        .write_record(TEMPLATE_HEADERS)
        .expect("writing to a Vec cannot fail");
    writer
        .write_record(EXAMPLE_ROW)
        .expect("writing to a Vec cannot fail");

    let bytes = writer.into_inner().expect("flushing a Vec cannot fail");
    String::from_utf8(bytes).expect("template cells are UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TemplateKind;
    use crate::parser::parse_csv_str;
    use crate::transform::aliases::ResolverConfig;

    #[test]
    fn test_template_layout() {
        let csv = template_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(TEMPLATE_HEADERS.join(";").as_str()));
        assert_eq!(lines.next(), Some(EXAMPLE_ROW.join(";").as_str()));
        assert_eq!(lines.next(), None);
        assert!(csv.starts_with("Disciplina;Frente;Módulo;Nome do Módulo;Aula;"));
    }

    #[test]
    fn test_template_is_detected_as_new() {
        let table = parse_csv_str(&template_csv(), None).unwrap();
        let kind = crate::validation::validate(&table.rows, &ResolverConfig::default()).unwrap();
        assert_eq!(kind, TemplateKind::New);
    }
}
