//! Integration tests for guidance projection.

use std::path::Path;

use api_guidance::{
    limit_enum, load_document, load_document_str, mark_required, project, project_with, prune,
    reachable_schemas, remove_property, validate_draft, Document, GuidanceError,
    GuidanceOptions, InlineSchema, PolicyEdit, PolicyRule, PolicyTable, RolePredicate, Schema,
    UseCase, UserRole, ValidateError, Verb,
};
use serde_json::{json, Value};

fn fixture() -> Document {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/users.openapi.yaml");
    load_document(&path).unwrap()
}

fn options(use_case: UseCase, roles: &[UserRole]) -> GuidanceOptions {
    GuidanceOptions::new("/api/users", Verb::Post)
        .use_case(use_case)
        .roles(roles.to_vec())
}

fn inline<'a>(doc: &'a Document, name: &str) -> &'a InlineSchema {
    doc.component(name)
        .and_then(Schema::as_inline)
        .unwrap_or_else(|| panic!("component {} missing", name))
}

fn required(doc: &Document) -> Vec<&str> {
    inline(doc, "User")
        .required
        .iter()
        .map(String::as_str)
        .collect()
}

fn enum_values(doc: &Document, name: &str) -> Vec<Value> {
    inline(doc, name).enum_values.clone()
}

fn has_property(doc: &Document, prop: &str) -> bool {
    inline(doc, "User").properties.contains_key(prop)
}

// === Selection ===

mod selection {
    use super::*;

    #[test]
    fn leaves_single_path_and_operation() {
        let doc = project(fixture(), &options(UseCase::Default, &[])).unwrap();
        assert_eq!(doc.paths.len(), 1);
        let (path, verb, _) = doc.sole_operation().unwrap();
        assert_eq!(path, "/api/Users");
        assert_eq!(verb, Verb::Post);
    }

    #[test]
    fn other_operation_can_be_selected() {
        let opts = GuidanceOptions::new("/API/USERS/{ID}", Verb::Put);
        let doc = project(fixture(), &opts).unwrap();
        let (path, verb, _) = doc.sole_operation().unwrap();
        assert_eq!(path, "/api/Users/{id}");
        assert_eq!(verb, Verb::Put);
    }

    #[test]
    fn missing_path_is_contract_not_found() {
        let opts = GuidanceOptions::new("/api/orders", Verb::Post);
        assert_eq!(
            project(fixture(), &opts).unwrap_err(),
            GuidanceError::ContractNotFound {
                path: "/api/orders".into(),
                verb: None
            }
        );
    }

    #[test]
    fn missing_verb_is_contract_not_found() {
        let opts = GuidanceOptions::new("/api/users", Verb::Patch);
        assert_eq!(
            project(fixture(), &opts).unwrap_err(),
            GuidanceError::ContractNotFound {
                path: "/api/Users".into(),
                verb: Some("patch".into())
            }
        );
    }

    #[test]
    fn operation_without_request_body_is_invariant_violation() {
        let opts = GuidanceOptions::new("/api/users/{id}", Verb::Delete);
        assert!(matches!(
            project(fixture(), &opts),
            Err(GuidanceError::InvariantViolation { .. })
        ));
    }
}

// === Pruning ===

mod pruning {
    use super::*;

    fn object() -> InlineSchema {
        InlineSchema::typed("object")
    }

    fn cyclic() -> Document {
        let mut doc = Document::default();
        let schemas = &mut doc.components.schemas;
        schemas.insert(
            "Root".into(),
            Schema::inline(object().with_property("a", Schema::reference("A"))),
        );
        schemas.insert(
            "A".into(),
            Schema::inline(
                object()
                    .with_property("self", Schema::reference("A"))
                    .with_property("b", Schema::reference("B")),
            ),
        );
        schemas.insert(
            "B".into(),
            Schema::inline(InlineSchema {
                all_of: vec![Schema::reference("A")],
                ..InlineSchema::default()
            }),
        );
        schemas.insert(
            "Island".into(),
            Schema::inline(object().with_property("loop", Schema::reference("Island"))),
        );
        doc
    }

    #[test]
    fn keeps_only_request_body_schemas() {
        let doc = project(fixture(), &options(UseCase::Default, &[])).unwrap();
        let names: Vec<&String> = doc.components.schemas.keys().collect();
        assert_eq!(names, ["IdentificationType", "User", "UserRole"]);
    }

    #[test]
    fn cycles_terminate_and_are_retained() {
        let mut doc = cyclic();
        let removed = prune(&mut doc, &Schema::reference("Root")).unwrap();
        assert_eq!(removed, ["Island"]);
        for name in ["Root", "A", "B"] {
            assert!(doc.component(name).is_some(), "{} pruned", name);
        }
    }

    #[test]
    fn pruning_is_idempotent() {
        let root = Schema::reference("Root");
        let mut once = cyclic();
        prune(&mut once, &root).unwrap();
        let mut twice = once.clone();
        let removed = prune(&mut twice, &root).unwrap();
        assert!(removed.is_empty());
        assert_eq!(once, twice);
    }

    #[test]
    fn inline_root_is_traversed_not_recorded() {
        let doc = cyclic();
        let root = Schema::inline(
            InlineSchema::typed("array").with_items(Schema::reference("B")),
        );
        let reached = reachable_schemas(&doc.components.schemas, &root).unwrap();
        let mut names: Vec<&str> = reached.iter().map(String::as_str).collect();
        names.sort();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn dangling_reference_fails_projection() {
        let mut doc = fixture();
        doc.components.schemas.shift_remove("UserRole");
        assert_eq!(
            project(doc, &options(UseCase::Default, &[])).unwrap_err(),
            GuidanceError::SchemaNotFound {
                name: "UserRole".into()
            }
        );
    }

    #[test]
    fn removed_property_target_is_not_repruned() {
        let doc = project(fixture(), &options(UseCase::LightweightClient, &[])).unwrap();
        assert!(!has_property(&doc, "identificationType"));
        assert!(doc.component("IdentificationType").is_some());
    }
}

// === Adjustment ===

mod adjustment {
    use super::*;

    #[test]
    fn edits_are_idempotent() {
        let mut doc = fixture();
        mark_required(&mut doc, "User", "email").unwrap();
        remove_property(&mut doc, "User", "zipCode").unwrap();
        limit_enum(&mut doc, "UserRole", &["tradeManager", "retailUser"]).unwrap();
        let once = doc.clone();

        mark_required(&mut doc, "User", "email").unwrap();
        remove_property(&mut doc, "User", "zipCode").unwrap();
        limit_enum(&mut doc, "UserRole", &["tradeManager", "retailUser"]).unwrap();
        assert_eq!(doc, once);
        assert_eq!(
            enum_values(&doc, "UserRole"),
            vec![json!("retailUser"), json!("tradeManager")]
        );
    }

    #[test]
    fn limit_enum_shrinks_monotonically() {
        let mut doc = fixture();
        let before = enum_values(&doc, "UserRole").len();
        limit_enum(&mut doc, "UserRole", &["clientManager", "superUser"]).unwrap();
        let after = enum_values(&doc, "UserRole");
        assert!(after.len() <= before);
        assert_eq!(after, vec![json!("clientManager")]);
    }

    #[test]
    fn removing_absent_property_changes_nothing() {
        let mut doc = fixture();
        remove_property(&mut doc, "User", "nickname").unwrap();
        assert_eq!(doc, fixture());
    }

    #[test]
    fn missing_schema_is_error() {
        let mut doc = fixture();
        assert_eq!(
            mark_required(&mut doc, "Client", "email").unwrap_err(),
            GuidanceError::SchemaNotFound {
                name: "Client".into()
            }
        );
    }
}

// === Use-case scenarios ===

mod scenarios {
    use super::*;

    const RETAIL_PROFILE: [&str; 6] = [
        "userName",
        "email",
        "address",
        "zipCode",
        "identificationType",
        "roles",
    ];

    #[test]
    fn default_applies_no_edits() {
        let full = fixture();
        let doc = project(
            fixture(),
            &options(UseCase::Default, &[UserRole::ClientManager]),
        )
        .unwrap();
        assert_eq!(doc.component("User"), full.component("User"));
        assert_eq!(doc.component("UserRole"), full.component("UserRole"));
        assert_eq!(required(&doc), ["userId"]);
    }

    #[test]
    fn strict_client_creation() {
        let doc = project(
            fixture(),
            &options(UseCase::ClientCreation, &[UserRole::RetailUser]),
        )
        .unwrap();
        let req = required(&doc);
        for prop in RETAIL_PROFILE {
            assert!(req.contains(&prop), "{} not required", prop);
        }
        assert_eq!(enum_values(&doc, "UserRole"), vec![json!("retailUser")]);
    }

    #[test]
    fn user_creation_without_roles() {
        let doc = project(fixture(), &options(UseCase::UserCreation, &[])).unwrap();
        assert_eq!(required(&doc), ["userId", "userName", "email"]);
        assert_eq!(enum_values(&doc, "UserRole").len(), 5);
    }

    #[test]
    fn user_creation_retail_user() {
        let doc = project(
            fixture(),
            &options(UseCase::UserCreation, &[UserRole::RetailUser]),
        )
        .unwrap();
        let req = required(&doc);
        for prop in RETAIL_PROFILE {
            assert!(req.contains(&prop), "{} not required", prop);
        }
        assert_eq!(enum_values(&doc, "UserRole"), vec![json!("retailUser")]);
        assert_eq!(
            enum_values(&doc, "IdentificationType"),
            vec![json!("passport")]
        );
    }

    #[test]
    fn user_creation_non_retail_role() {
        let doc = project(
            fixture(),
            &options(UseCase::UserCreation, &[UserRole::TradeManager]),
        )
        .unwrap();
        for prop in ["address", "zipCode", "identificationType"] {
            assert!(!has_property(&doc, prop), "{} still present", prop);
        }
        assert!(has_property(&doc, "email"));
        assert_eq!(
            enum_values(&doc, "UserRole"),
            vec![
                json!("tradeSupervisor"),
                json!("tradeManager"),
                json!("clientSupervisor"),
                json!("clientManager")
            ]
        );
    }

    #[test]
    fn only_first_role_counts() {
        let doc = project(
            fixture(),
            &options(
                UseCase::UserCreation,
                &[UserRole::ClientSupervisor, UserRole::RetailUser],
            ),
        )
        .unwrap();
        assert!(!has_property(&doc, "address"));
    }

    #[test]
    fn lightweight_client() {
        let doc = project(fixture(), &options(UseCase::LightweightClient, &[])).unwrap();
        for prop in ["email", "address", "zipCode", "identificationType"] {
            assert!(!has_property(&doc, prop), "{} still present", prop);
        }
        assert!(has_property(&doc, "userName"));
        assert_eq!(enum_values(&doc, "UserRole"), vec![json!("retailUser")]);
    }

    #[test]
    fn unknown_use_case_returns_no_document() {
        let err = "partner-onboarding".parse::<UseCase>().unwrap_err();
        assert_eq!(
            err,
            GuidanceError::UnsupportedUseCase {
                value: "partner-onboarding".into()
            }
        );

        let table = PolicyTable {
            rules: vec![PolicyRule::new(
                UseCase::Default,
                RolePredicate::Any,
                Vec::new(),
            )],
        };
        let result = project_with(
            fixture(),
            &options(UseCase::LightweightClient, &[]),
            &table,
        );
        assert_eq!(
            result.unwrap_err(),
            GuidanceError::UnsupportedUseCase {
                value: "lightweight-client".into()
            }
        );
    }

    #[test]
    fn custom_table_drives_edits() {
        let table = PolicyTable {
            rules: vec![PolicyRule::new(
                UseCase::Default,
                RolePredicate::FirstRoleIs(UserRole::ClientManager),
                vec![PolicyEdit::remove_property("User", "roles")],
            )],
        };
        let doc = project_with(
            fixture(),
            &options(UseCase::Default, &[UserRole::ClientManager]),
            &table,
        )
        .unwrap();
        assert!(!has_property(&doc, "roles"));
        // Pruning happened before the edit.
        assert!(doc.component("UserRole").is_some());
    }
}

// === Output and validation ===

mod output {
    use super::*;
    use api_guidance::{render_document, Format};

    #[test]
    fn yaml_output_reloads_to_same_document() {
        let doc = project(
            fixture(),
            &options(UseCase::ClientCreation, &[UserRole::RetailUser]),
        )
        .unwrap();
        let yaml = render_document(&doc, Format::Yaml).unwrap();
        assert!(yaml.contains("/api/Users:"));
        assert_eq!(load_document_str(&yaml).unwrap(), doc);
    }

    #[test]
    fn json_output_uses_openapi_keys() {
        let doc = project(fixture(), &options(UseCase::Default, &[])).unwrap();
        let value: Value =
            serde_json::from_str(&render_document(&doc, Format::Json).unwrap()).unwrap();
        assert_eq!(
            value["paths"]["/api/Users"]["post"]["requestBody"]["content"]["application/json"]
                ["schema"]["$ref"],
            json!("#/components/schemas/User")
        );
        assert_eq!(
            value["components"]["schemas"]["User"]["properties"]["roles"]["items"]["$ref"],
            json!("#/components/schemas/UserRole")
        );
        assert!(value["paths"]["/api/Users"].get("get").is_none());
    }

    #[test]
    fn draft_validated_against_guidance() {
        let doc = project(
            fixture(),
            &options(UseCase::LightweightClient, &[UserRole::RetailUser]),
        )
        .unwrap();

        let ok = json!({ "userId": 1, "userName": "ana", "roles": ["retailUser"] });
        assert!(validate_draft(&doc, &ok).is_ok());

        let bad = json!({ "userId": 1, "email": "ana@example.com", "roles": ["tradeManager"] });
        match validate_draft(&doc, &bad) {
            Err(ValidateError::Invalid { errors }) => assert!(errors.len() >= 2),
            other => panic!("expected invalid draft, got {:?}", other),
        }
    }
}
