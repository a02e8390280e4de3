use quickslot::api_json::*;
use quickslot::models::Catalog;
use quickslot::{parse_catalog, GenerateOptions, ScheduleError};

fn catalogo() -> Catalog {
    let json = r#"
    {
        "subjects": [
            {
                "codigo": "MAT1",
                "nombre": "Cálculo I",
                "secciones": [
                    { "seccion": 1, "cupos": 12, "profesor": "Ana Pérez", "horario": ["LU MI 08:00-10:00"] },
                    { "seccion": 2, "cupos": 4, "profesor": "Luis Soto", "horario": ["MA JU 10:00-12:00"] }
                ]
            },
            {
                "code": "PRG1",
                "name": "Programación",
                "groups": [
                    { "number": "1", "capacity_max": 40, "capacity_available": 7,
                      "slots": [{ "days": ["LU"], "start_hour": 9, "end_hour": 11, "room": "Lab 3" }] },
                    { "number": "2", "capacity_max": 40, "capacity_available": 7,
                      "slots": ["VI 14:00-16:00 Sala B-201"] }
                ]
            },
            {
                "code": "QUI1",
                "name": "Química",
                "groups": [
                    { "number": "1", "capacity_available": 3, "slots": ["SA 09:00-11:00"] }
                ]
            }
        ]
    }
    "#;
    parse_catalog(json).expect("Debe parsear el catálogo")
}

#[test]
fn test_handle_request_con_nombres() {
    let cat = catalogo();
    let json = r#"
    {
        "selected": ["MAT1", "Programcion", "QUIMICA"],
        "options": { "top_k": 10, "avoid_gaps": true }
    }
    "#;
    let resp = handle_request(&cat, json, GenerateOptions::default()).expect("Debe generar horarios");
    assert_eq!(resp.selected, vec!["MAT1", "PRG1", "QUI1"]);
    assert_eq!(resp.resolved.iter().map(|r| r.entry.as_str()).collect::<Vec<_>>(), vec!["Programcion", "QUIMICA"]);
    assert!(resp.unknown_codes.is_empty());
    assert!(!resp.partial);
    assert!(resp.stop_reason.is_none());
    // MAT1-1 choca con PRG1-1 el lunes 9-10; quedan 3 combinaciones
    assert_eq!(resp.combinations_found, 3);
    assert_eq!(resp.schedules_count, 3);
    assert!(resp.schedules.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn test_handle_request_codigo_desconocido() {
    let cat = catalogo();
    let json = r#"{ "selected": ["MAT1", "Historia del Arte"] }"#;
    let resp = handle_request(&cat, json, GenerateOptions::default()).unwrap();
    assert_eq!(resp.unknown_codes, vec!["Historia del Arte"]);
    assert_eq!(resp.schedules_count, 2);

    let json = r#"{ "selected": ["MAT1", "Historia del Arte"], "options": { "unknown_codes": "reject" } }"#;
    let err = handle_request(&cat, json, GenerateOptions::default()).unwrap_err();
    assert!(matches!(err, ScheduleError::UnknownSubject(_)));
}

#[test]
fn test_respuesta_serializada() {
    let cat = catalogo();
    let resp = handle_request(&cat, r#"{ "selected": ["PRG1"] }"#, GenerateOptions::default()).unwrap();
    let value = serde_json::to_value(&resp).unwrap();
    assert!(value["generated_at"].is_string());
    assert_eq!(value["schedules_count"], 2);
    assert_eq!(value["partial"], false);
    assert!(value["stop_reason"].is_null());
    let primero = &value["schedules"][0];
    assert!(primero["score"].is_i64());
    assert!(primero["combination"][0]["subject_code"] == "PRG1");
}

#[test]
fn test_respuesta_parcial_serializada() {
    let cat = catalogo();
    let json = r#"{ "selected": ["MAT1", "PRG1"], "options": { "max_combinations": 1 } }"#;
    let resp = handle_request(&cat, json, GenerateOptions::default()).unwrap();
    assert!(resp.partial);
    let value = serde_json::to_value(&resp).unwrap();
    assert_eq!(value["stop_reason"], "combination_limit");
}

#[test]
fn test_peticion_invalida() {
    let cat = catalogo();
    for bad in [
        r#"{ "options": {} }"#,
        r#"{ "selected": ["MAT1"], "options": { "top_k": 0 } }"#,
        r#"{ "selected": ["MAT1"], "options": { "min_start_hour": 30 } }"#,
        r#"no es json"#,
    ] {
        let err = handle_request(&cat, bad, GenerateOptions::default()).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidInput(_)), "{}", bad);
    }
}

#[test]
fn test_resolve_in_catalog() {
    let cat = catalogo();
    let code = |entry: &str| resolve_in_catalog(&cat, entry).map(|m| (m.code, m.kind));
    assert_eq!(code("MAT1"), Some(("MAT1".to_string(), MatchKind::Code)));
    assert_eq!(code("  calculo i "), Some(("MAT1".to_string(), MatchKind::Name)));
    assert_eq!(code("Quimca"), Some(("QUI1".to_string(), MatchKind::Fuzzy)));
    assert_eq!(code("Historia"), None);
    assert_eq!(code(""), None);
}

fn catalogo_con_numerados() -> quickslot::models::Catalog {
    parse_catalog(
        r#"[
            {"code": "MAT2", "name": "Cálculo II", "groups": [{"number": "1", "capacity_available": 5, "slots": ["LU 08-10"]}]},
            {"code": "FIS1", "name": "Física I", "groups": [{"number": "1", "capacity_available": 5, "slots": ["MA 08-10"]}]},
            {"code": "ALG1", "name": "Algebra Lineal", "groups": [{"number": "1", "capacity_available": 5, "slots": ["MI 08-10"]}]},
            {"code": "ALG2", "name": "Algebra Lineas", "groups": [{"number": "1", "capacity_available": 5, "slots": ["JU 08-10"]}]}
        ]"#,
    )
    .unwrap()
}

#[test]
fn test_numero_final_distinto_no_se_sustituye() {
    let cat = catalogo_con_numerados();
    assert!(resolve_in_catalog(&cat, "Cálculo III").is_none());
    assert!(resolve_in_catalog(&cat, "Fisica II").is_none());
    // mismo número escrito distinto sí calza
    assert_eq!(resolve_in_catalog(&cat, "Calculo 2").map(|m| m.code).as_deref(), Some("MAT2"));

    let json = r#"{ "selected": ["Cálculo III"], "options": { "unknown_codes": "reject" } }"#;
    match handle_request(&cat, json, GenerateOptions::default()) {
        Err(ScheduleError::UnknownSubject(codes)) => assert_eq!(codes, vec!["Cálculo III"]),
        other => panic!("se esperaba UnknownSubject, llegó {:?}", other.map(|r| r.selected)),
    }

    let resp = handle_request(&cat, r#"{ "selected": ["Cálculo III", "Fisica II"] }"#, GenerateOptions::default()).unwrap();
    assert_eq!(resp.unknown_codes, vec!["Cálculo III", "Fisica II"]);
    assert!(resp.resolved.is_empty());
    assert_eq!(resp.schedules_count, 0);
}

#[test]
fn test_match_difuso_ambiguo_queda_sin_resolver() {
    let cat = catalogo_con_numerados();
    // "algebra linea" se parece a ambos nombres
    assert!(resolve_in_catalog(&cat, "Algebra Linea").is_none());
}

#[test]
fn test_sustituciones_reportadas_y_reject() {
    let cat = catalogo();
    let resp = handle_request(&cat, r#"{ "selected": ["Programcion", "calculo i"] }"#, GenerateOptions::default()).unwrap();
    assert_eq!(resp.selected, vec!["PRG1", "MAT1"]);
    assert_eq!(resp.resolved.len(), 2);
    assert_eq!(resp.resolved[0].entry, "Programcion");
    assert_eq!(resp.resolved[0].kind, MatchKind::Fuzzy);
    assert!(resp.resolved[0].similarity >= FUZZY_NAME_THRESHOLD && resp.resolved[0].similarity < 1.0);
    assert_eq!(resp.resolved[1].kind, MatchKind::Name);

    // con reject, sólo el match exacto por nombre se acepta
    let json = r#"{ "selected": ["Programcion", "calculo i"], "options": { "unknown_codes": "reject" } }"#;
    let err = handle_request(&cat, json, GenerateOptions::default()).unwrap_err();
    assert!(matches!(err, ScheduleError::UnknownSubject(ref codes) if codes == &vec!["Programcion".to_string()]));
}

#[test]
fn test_check_picks() {
    let cat = catalogo();
    let report = check_picks(&cat, &["MAT1:1", "PRG1:1"]).unwrap();
    assert!(!report.ok);
    assert_eq!(report.conflicts.len(), 1);
    let c = &report.conflicts[0];
    assert_eq!((c.overlap_start, c.overlap_end), (9, 10));

    let report = check_picks(&cat, &["MAT1:2", "PRG1:1", "QUI1:1"]).unwrap();
    assert!(report.ok);
}

#[test]
fn test_check_picks_ramo_repetido() {
    let cat = catalogo();
    // misma sección dos veces: no es un choque consigo misma
    assert!(matches!(check_picks(&cat, &["MAT1:1", "MAT1:1"]), Err(ScheduleError::InvalidInput(_))));
    // dos secciones del mismo ramo tampoco forman un horario
    assert!(matches!(check_picks(&cat, &["MAT1:1", "MAT1:2"]), Err(ScheduleError::InvalidInput(_))));
    assert!(matches!(check_picks(&cat, &["MAT1:2", "PRG1:2", " MAT1 :1"]), Err(ScheduleError::InvalidInput(_))));
}

#[test]
fn test_check_picks_errores() {
    let cat = catalogo();
    assert!(matches!(check_picks(&cat, &["MAT1"]), Err(ScheduleError::InvalidInput(_))));
    assert!(matches!(check_picks(&cat, &["XXX:1"]), Err(ScheduleError::UnknownSubject(_))));
    assert!(matches!(check_picks(&cat, &["MAT1:9"]), Err(ScheduleError::InvalidInput(_))));
}
