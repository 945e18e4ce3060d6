// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn implicit_range_expands_with_decimal_code() {
    let range = TypeEnumRange::Implicit {
        min_enum_id: 3,
        max_enum_id: 5,
    };
    let rows = range.expanded();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].code, "3");
    assert_eq!(rows[0].description, "3");
    assert_eq!(rows[0].note, "");
    assert_eq!(rows[2].enum_id, 5);
}

#[test]
fn implicit_range_packed_is_identity() {
    let range = TypeEnumRange::Implicit {
        min_enum_id: 0,
        max_enum_id: 10,
    };
    assert_eq!(range.packed(), Some((0, 10)));
}

#[test]
fn explicit_range_packed_derives_min_max() {
    let range = TypeEnumRange::Explicit(vec![
        TypeEnumRow {
            enum_id: 2,
            code: "2".into(),
            description: "2".into(),
            note: String::new(),
        },
        TypeEnumRow {
            enum_id: 7,
            code: "7".into(),
            description: "7".into(),
            note: String::new(),
        },
    ]);
    assert_eq!(range.packed(), Some((2, 7)));
}

#[test]
fn model_basic_from_model() {
    let model = Model {
        digest: ModelDigest::new("d1"),
        name: "RiskPaths".into(),
        version: "1.0".into(),
        default_lang: "EN".into(),
        exe_path: "/models/RiskPaths".into(),
        db_path: "/models/RiskPaths.sqlite".into(),
        bin_dir: "/models".into(),
    };
    let basic = ModelBasic::from(&model);
    assert_eq!(basic.name, "RiskPaths");
    assert_eq!(basic.digest, model.digest);
}
