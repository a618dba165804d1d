use pdf_fields::*;

fn place(model: &mut FieldModel, field_type: FieldType) -> FieldId {
    model
        .add(field_type, ViewportPoint::new(10.0, 10.0), 0, 792.0, 1.0)
        .id()
}

#[test]
fn test_checkbox_drop_example() {
    let mut model = FieldModel::new();
    let field = model.add(
        FieldType::Checkbox,
        ViewportPoint::new(100.0, 200.0),
        0,
        792.0,
        2.08,
    );

    assert_eq!(field.rect().width, 15.0);
    assert_eq!(field.rect().height, 15.0);
    assert!((field.rect().x - 48.077).abs() < 0.01);
    assert!((field.rect().y - (792.0 - 200.0 / 2.08 - 15.0)).abs() < 0.01);
    assert_eq!(field.page(), 0);
    assert_eq!(field.page_height(), 792.0);
    assert_eq!(field.assigned_to(), SignerRole::SignerA);
    assert_eq!(field.value(), None);
    assert_eq!(field.name(), "Case a cocher 1");
}

#[test]
fn test_default_sizes() {
    assert_eq!(FieldType::Text.default_size(), (200.0, 20.0));
    assert_eq!(FieldType::Checkbox.default_size(), (15.0, 15.0));
    assert_eq!(FieldType::Radio.default_size(), (15.0, 15.0));
}

#[test]
fn test_names_never_reused_after_delete() {
    let mut model = FieldModel::new();
    let first = place(&mut model, FieldType::Text);
    place(&mut model, FieldType::Text);
    assert!(model.remove(first));
    place(&mut model, FieldType::Text);

    let names: Vec<&str> = model.fields().iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["Texte 2", "Texte 3"]);
    assert_eq!(model.counters().issued(FieldType::Text), 3);
}

#[test]
fn test_counters_are_per_type() {
    let mut model = FieldModel::new();
    place(&mut model, FieldType::Text);
    place(&mut model, FieldType::Radio);
    place(&mut model, FieldType::Text);
    place(&mut model, FieldType::Checkbox);

    let names: Vec<&str> = model.fields().iter().map(|f| f.name()).collect();
    assert_eq!(
        names,
        vec!["Texte 1", "Bouton radio 1", "Texte 2", "Case a cocher 1"]
    );
}

#[test]
fn test_ids_unique_and_not_reused() {
    let mut model = FieldModel::new();
    let a = place(&mut model, FieldType::Text);
    let b = place(&mut model, FieldType::Text);
    model.remove(b);
    let c = place(&mut model, FieldType::Text);
    assert_ne!(a, b);
    assert_ne!(b, c);
    assert_ne!(a, c);
}

#[test]
fn test_remove_unknown_id_is_noop() {
    let mut model = FieldModel::new();
    place(&mut model, FieldType::Text);
    let before = model.clone();

    assert!(!model.remove(FieldId(999)));
    assert_eq!(model, before);
}

#[test]
fn test_move_has_no_bounds_clamping() {
    let mut model = FieldModel::new();
    let id = place(&mut model, FieldType::Checkbox);
    let start = model.get(id).unwrap().rect();

    assert!(model.move_by(id, -5000.0, 3000.0));
    let moved = model.get(id).unwrap().rect();
    assert_eq!(moved.x, start.x - 5000.0);
    assert_eq!(moved.y, start.y + 3000.0);
}

#[test]
fn test_zero_move_reports_no_change() {
    let mut model = FieldModel::new();
    let id = place(&mut model, FieldType::Text);
    assert!(!model.move_by(id, 0.0, 0.0));
}

#[test]
fn test_rename_trims_and_ignores_empty() {
    let mut model = FieldModel::new();
    let id = place(&mut model, FieldType::Text);

    assert!(!model.rename(id, "   "));
    assert_eq!(model.get(id).unwrap().name(), "Texte 1");

    assert!(model.rename(id, "  Nom complet "));
    assert_eq!(model.get(id).unwrap().name(), "Nom complet");

    assert!(!model.rename(id, "Nom complet"));
}

#[test]
fn test_mutating_deleted_field_is_ignored() {
    let mut model = FieldModel::new();
    let id = place(&mut model, FieldType::Text);
    model.remove(id);

    assert!(!model.rename(id, "x"));
    assert!(!model.set_value(id, Some("v".into())));
    assert!(!model.reassign(id, SignerRole::SignerB));
    assert!(!model.move_by(id, 1.0, 1.0));
    assert!(model.is_empty());
}

#[test]
fn test_mutations_are_isolated_by_id() {
    let mut model = FieldModel::new();
    let a = place(&mut model, FieldType::Text);
    let b = place(&mut model, FieldType::Text);
    let b_before = model.get(b).unwrap().clone();

    model.set_value(a, Some("hello".into()));
    model.reassign(a, SignerRole::SignerB);
    model.move_by(a, 3.0, 4.0);

    assert_eq!(model.get(b).unwrap(), &b_before);
    assert_eq!(model.get(a).unwrap().value(), Some("hello"));
    assert_eq!(model.get(a).unwrap().assigned_to(), SignerRole::SignerB);
}

#[test]
fn test_workflow_requests_need_fields() {
    let model = FieldModel::new();
    assert_eq!(model.workflow_requests(), Err(FieldsError::NoFields));
}

#[test]
fn test_workflow_requests_reject_duplicate_names() {
    let mut model = FieldModel::new();
    let a = place(&mut model, FieldType::Text);
    let b = place(&mut model, FieldType::Text);
    model.rename(a, "Nom");
    model.rename(b, "Nom");

    assert_eq!(
        model.workflow_requests(),
        Err(FieldsError::DuplicateFieldName("Nom".to_string()))
    );
}

#[test]
fn test_requests_carry_assignment_only_for_workflows() {
    let mut model = FieldModel::new();
    let a = place(&mut model, FieldType::Text);
    model.reassign(a, SignerRole::SignerB);

    let flat = model.flatten_requests();
    assert_eq!(flat[0].assigned_to, None);

    let wf = model.workflow_requests().unwrap();
    assert_eq!(wf[0].assigned_to, Some(SignerRole::SignerB));
    assert_eq!(wf[0].name, "Texte 1");
    assert_eq!(wf[0].width, 200.0);
}

#[cfg(feature = "serde")]
#[test]
fn test_wire_tokens() {
    let mut model = FieldModel::new();
    place(&mut model, FieldType::Checkbox);
    let json = serde_json::to_value(&model.workflow_requests().unwrap()[0]).unwrap();

    assert_eq!(json["type"], "CHECKBOX");
    assert_eq!(json["assignedTo"], "SIGNER_A");
    assert_eq!(json["pageHeight"], 792.0);
    assert!(json.get("id").is_none());
}

#[cfg(feature = "serde")]
#[test]
fn test_restored_model_keeps_ids_and_names_unique() {
    let mut model = FieldModel::new();
    place(&mut model, FieldType::Text);
    place(&mut model, FieldType::Checkbox);
    let stored = serde_json::to_value(&model).unwrap();

    let restored: FieldModel = serde_json::from_value(stored.clone()).unwrap();
    assert_eq!(restored, model);

    let mut rewound = stored.clone();
    rewound["ids"]["next"] = 1.into();
    assert!(serde_json::from_value::<FieldModel>(rewound).is_err());

    let mut duplicated = stored.clone();
    let first = duplicated["fields"][0].clone();
    duplicated["fields"].as_array_mut().unwrap().push(first);
    assert!(serde_json::from_value::<FieldModel>(duplicated).is_err());

    let mut behind = stored;
    behind["counters"]["text"] = 0.into();
    let err = serde_json::from_value::<FieldModel>(behind).unwrap_err();
    assert!(err.to_string().contains("names issued"));
}

#[test]
fn test_check_accepts_edited_models() {
    let mut model = FieldModel::new();
    let a = place(&mut model, FieldType::Text);
    model.rename(a, "Texte 40");
    let b = place(&mut model, FieldType::Radio);
    model.remove(b);
    model.clear();
    place(&mut model, FieldType::Checkbox);

    assert_eq!(model.check(), Ok(()));
}
