//! End-to-end imports through the public API.

use curriculum_import::{
    import_bytes, import_file, ContextError, ImportError, ImportOptions, Importance, PipelineError,
    TemplateKind,
};
use rust_xlsxwriter::{Format, Workbook};

fn options(discipline: Option<&str>, front: Option<&str>) -> ImportOptions {
    ImportOptions {
        course_id: Some("curso-enem".to_string()),
        discipline: discipline.map(String::from),
        front: front.map(String::from),
        ..ImportOptions::default()
    }
}

fn new_template_xlsx() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let time = Format::new().set_num_format("hh:mm:ss");

    let headers = [
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
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }

    // Day-fraction duration, stored as a time cell
    sheet.write_string(1, 0, "Física").unwrap();
    sheet.write_string(1, 1, "Frente A").unwrap();
    sheet.write_number(1, 2, 1).unwrap();
    sheet.write_string(1, 3, "Cinemática").unwrap();
    sheet.write_number(1, 4, 1).unwrap();
    sheet.write_string(1, 5, "MRU").unwrap();
    sheet.write_number_with_format(1, 6, 900.0 / 86_400.0, &time).unwrap();
    sheet.write_number(1, 7, 3).unwrap();
    sheet.write_string(1, 8, "Alta").unwrap();

    // Plain minutes
    sheet.write_string(2, 0, "Física").unwrap();
    sheet.write_string(2, 1, "Frente A").unwrap();
    sheet.write_number(2, 2, 1).unwrap();
    sheet.write_string(2, 3, "Cinemática").unwrap();
    sheet.write_number(2, 4, 2).unwrap();
    sheet.write_string(2, 5, "MRUV").unwrap();
    sheet.write_number(2, 6, 25).unwrap();
    sheet.write_string(2, 8, "m").unwrap();

    // No module or lesson: dropped
    sheet.write_string(3, 0, "Física").unwrap();
    sheet.write_string(3, 1, "Frente A").unwrap();
    sheet.write_number(3, 6, 10).unwrap();

    sheet.write_string(4, 0, "Física").unwrap();
    sheet.write_string(4, 1, "Frente A").unwrap();
    sheet.write_number(4, 2, 2).unwrap();
    sheet.write_string(4, 3, "Dinâmica").unwrap();
    sheet.write_number(4, 4, 2).unwrap();
    sheet.write_string(4, 5, "Leis de Newton").unwrap();
    sheet.write_string(4, 6, "01:05:30").unwrap();
    sheet.write_string(4, 7, "9").unwrap();
    sheet.write_string(4, 8, "Base").unwrap();

    workbook.save_to_buffer().unwrap()
}

#[test]
fn xlsx_new_template_end_to_end() {
    let bytes = new_template_xlsx();
    let report = import_bytes(&bytes, "Frente A.xlsx", &options(Some("fisica"), None)).unwrap();

    assert_eq!(report.template, TemplateKind::New);
    assert_eq!(report.payload.discipline_name, "fisica");
    assert_eq!(report.payload.front_name, "Frente A");
    assert_eq!(report.payload.course_id.as_deref(), Some("curso-enem"));

    let lessons = &report.payload.content;
    assert_eq!(lessons.len(), 3);

    assert_eq!(lessons[0].lesson_name, "MRU");
    assert_eq!(lessons[0].duration_minutes, Some(15));
    assert_eq!(lessons[0].priority, Some(3));
    assert_eq!(lessons[0].importance, Some(Importance::High));

    assert_eq!(lessons[1].duration_minutes, Some(25));
    assert_eq!(lessons[1].priority, None);
    assert_eq!(lessons[1].importance, Some(Importance::Medium));

    assert_eq!(lessons[2].module_number, 2);
    assert_eq!(lessons[2].lesson_number, 2);
    assert_eq!(lessons[2].duration_minutes, Some(66));
    assert_eq!(lessons[2].priority, None);
    assert_eq!(lessons[2].importance, Some(Importance::Base));

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].line(), 4);

    assert_eq!(report.modules.len(), 2);
    assert_eq!(report.modules[0].total_minutes, 40);
    assert_eq!(report.invalid_count, 0);
}

#[test]
fn legacy_csv_gets_sequential_numbers() {
    let csv = "\u{feff}Nome do Módulo;Nome da Aula;Duração\n\
        Óptica;Reflexão;12\n\
        Óptica;Refração;0,5\n\
        Ondas;Ondulatória;\n\
        Óptica;Reflexão;12\n";

    let report = import_bytes(
        csv.as_bytes(),
        "aulas.csv",
        &options(Some("Física"), Some("Frente B")),
    )
    .unwrap();

    assert_eq!(report.template, TemplateKind::Legacy);
    assert_eq!(report.table.headers[0], "nome do módulo");

    let numbers: Vec<(u32, u32)> = report
        .payload
        .content
        .iter()
        .map(|l| (l.module_number, l.lesson_number))
        .collect();
    assert_eq!(numbers, vec![(1, 1), (1, 2), (2, 1), (1, 1)]);

    // 0.5 of a day
    assert_eq!(report.payload.content[1].duration_minutes, Some(720));
    assert_eq!(report.payload.content[2].duration_minutes, None);
}

#[test]
fn skipped_row_after_blank_rows_reports_file_line() {
    let csv = "Nome do Módulo;Nome da Aula\n;\n;\n;\nCinemática;MRU\n;MRUV\n";

    let report = import_bytes(csv.as_bytes(), "aulas.csv", &options(Some("Física"), Some("A")))
        .unwrap();

    assert_eq!(report.payload.content.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].line(), 6);
}

#[test]
fn missing_lesson_column_is_rejected() {
    let csv = "Módulo;Nome do Módulo;Tempo\n1;Cinemática;10\n";
    let err = import_bytes(csv.as_bytes(), "aulas.csv", &options(Some("Física"), Some("A")))
        .unwrap_err();

    match err {
        PipelineError::Import(ImportError::MissingColumns(fields)) => {
            assert_eq!(fields, vec!["\"Aula\" ou \"Nome da Aula\""]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn front_mismatch_is_rejected() {
    let bytes = new_template_xlsx();
    let err = import_bytes(&bytes, "Frente A.xlsx", &options(None, Some("Frente B"))).unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Context(ContextError::FrontMismatch { .. })
    ));
    assert!(err.to_string().contains("Frente B"));
}

#[test]
fn header_only_file_is_empty() {
    let err = import_bytes(
        "Disciplina;Frente;Módulo;Aula\n".as_bytes(),
        "aulas.csv",
        &ImportOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::Import(ImportError::EmptyFile)));
}

#[test]
fn import_from_disk_and_serialize_payload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Frente A.xlsx");
    std::fs::write(&path, new_template_xlsx()).unwrap();

    let report = import_file(&path, &ImportOptions::default()).unwrap();
    let json = serde_json::to_value(&report.payload).unwrap();

    assert_eq!(json["p_frente_nome"], "Frente A");
    assert!(json["p_curso_id"].is_null());
    assert_eq!(json["p_conteudo"][0]["modulo_nome"], "Cinemática");
    assert_eq!(json["p_conteudo"][0]["tempo"], 15);
    assert_eq!(json["p_conteudo"][0]["importancia"], "Alta");
}

#[test]
fn unsupported_extension_is_rejected_before_reading() {
    let err = import_file(std::path::Path::new("/nonexistent/aulas.pdf"), &ImportOptions::default())
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedFormat(_)));
}
