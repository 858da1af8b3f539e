use std::sync::Arc;

use argonaut::framework::{
    attributes, Collection, Dto, DtoError, JsonOptions, Schema, Validation, Value,
};
use argonaut::lifecycle::try_setup_tracing;
use argonaut::model::{LegacyModel, ProductDto, ProductFeatureDto, ProductReviewDto, UserDto};
use once_cell::sync::Lazy;
use rstest::rstest;
use serde_json::json;

/// DTO holding an arbitrary value, used to feed the encoder things it cannot represent.
#[derive(Debug, Default)]
struct OpaqueDto {
    payload: Value,
}

static OPAQUE_SCHEMA: Lazy<Schema<OpaqueDto>> =
    Lazy::new(|| Schema::<OpaqueDto>::mutable().field("payload", |d| &d.payload, |d| &mut d.payload));

impl Dto for OpaqueDto {
    fn schema() -> &'static Schema<Self> {
        &OPAQUE_SCHEMA
    }
}

fn test_user() -> UserDto {
    UserDto::from_json(json!({
        "email": "test@user.com",
        "firstName": "Test",
        "lastName": "User",
        "registeredAt": "2023-01-01 10:00:00",
    }))
    .expect("Failed to build user")
}

#[test]
fn test_sets_and_casts_basic_fields() {
    try_setup_tracing();
    let user = test_user();

    assert_eq!(user.full_name.as_deref(), Some("Test User"));
    assert_eq!(
        user.registered_at.expect("registeredAt not cast").date_naive().to_string(),
        "2023-01-01"
    );
}

#[test]
fn test_casts_nested_array_and_collection() {
    let product = ProductDto::from_json(json!({
        "title": "Desk",
        "features": [{"name": "Foldable"}],
        "reviews": [
            {"rating": 5, "comment": "Great!", "createdAt": "2023-01-01"},
            {"rating": 4, "comment": "Good.", "createdAt": "2023-01-02"},
        ],
    }))
    .expect("Failed to build product");

    assert_eq!(product.features[0].name, "Foldable");
    assert_eq!(product.reviews.len(), 2);
    let dates: Vec<String> = product
        .reviews
        .iter()
        .map(|review| review.created_at.expect("createdAt not cast").date_naive().to_string())
        .collect();
    assert_eq!(dates, ["2023-01-01", "2023-01-02"]);
}

#[test]
fn test_existing_instances_are_kept() {
    let feature = Arc::new(ProductFeatureDto::new(attributes([("name", Value::from("Feature E"))])).unwrap());
    let product = ProductDto::new(attributes([
        ("title", Value::from("Desk")),
        (
            "features",
            Value::List(vec![
                Value::Model(feature.clone()),
                Value::from(json!({"name": "Feature F"})),
            ]),
        ),
    ]))
    .unwrap();

    assert!(Arc::ptr_eq(&product.features[0], &feature));
    assert_eq!(product.features[1].name, "Feature F");
}

#[test]
fn test_invalid_reviews_are_rejected() {
    let err = ProductDto::from_json(json!({"title": "Desk", "reviews": "invalid-reviews"})).unwrap_err();
    assert!(matches!(err, DtoError::InvalidInput(_)), "unexpected error: {err:?}");
}

#[test]
fn test_serializes_to_array_and_json() {
    let user = test_user();
    let array = user.to_array(3);
    let keys: Vec<&str> = array.keys().map(String::as_str).collect();
    assert_eq!(keys, ["firstName", "lastName", "username", "fullName", "email", "registeredAt"]);

    let json = user.to_json(JsonOptions::default()).unwrap();
    let decoded: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded["fullName"], "Test User");
    assert_eq!(decoded["registeredAt"], "2023-01-01T10:00:00.000000Z");

    let pretty = user.to_json(JsonOptions::pretty()).unwrap();
    assert!(pretty.contains('\n'));
}

#[test]
fn test_json_encoding_failure() {
    let mut dto = OpaqueDto::default();
    dto.set_attribute("payload", Value::Handle(Arc::new(std::io::sink()))).unwrap();

    let err = dto.to_json(JsonOptions::default()).unwrap_err();
    assert!(matches!(err, DtoError::SerializationError(_)));
    assert!(err.to_string().starts_with("JSON error:"), "{err}");
}

#[test]
fn test_non_dto_objects_are_not_serializable() {
    let dto = OpaqueDto {
        payload: Value::model(LegacyModel { foo: "bar".into() }),
    };
    assert!(dto.to_array(3)["payload"].as_model().is_some());

    let err = dto.to_json(JsonOptions::default()).unwrap_err();
    assert!(err.to_string().contains("Object of class LegacyModel is not serializable"), "{err}");
}

#[test]
fn test_depth_zero_is_empty() {
    assert!(test_user().to_array(0).is_empty());
}

#[test]
fn test_nested_output_respects_depth() {
    let product = ProductDto::from_json(json!({
        "title": "Desk",
        "features": [{"name": "A", "subFeatures": [{"name": "B"}]}],
        "reviews": [{"rating": 5}, {"rating": 4}],
    }))
    .unwrap();

    let array = product.to_array(3);
    assert_eq!(array["reviews"].as_items().unwrap().len(), 2);
    assert!(matches!(array["reviews"], Value::List(_)));
    let feature = &array["features"].as_items().unwrap()[0];
    assert_eq!(feature.get("name"), Some(&Value::from("A")));
    let sub = &feature.get("subFeatures").unwrap().as_items().unwrap()[0];
    assert_eq!(sub.get("name"), Some(&Value::from("B")));

    let shallow = product.to_array(2);
    let sub = &shallow["features"].as_items().unwrap()[0]
        .get("subFeatures")
        .unwrap()
        .as_items()
        .unwrap()[0];
    assert_eq!(sub, &Value::Map(Default::default()));
}

#[test]
fn test_attributes_to_update_keep_objects() {
    let product = ProductDto::from_json(json!({"title": "Desk", "reviews": [{"rating": 5}]})).unwrap();
    let attributes = product.attributes_to_update();
    assert_eq!(attributes.len(), 4);
    let reviews = attributes["reviews"].as_items().unwrap();
    assert!(reviews[0].downcast_ref::<ProductReviewDto>().is_some());
}

#[test]
fn test_static_collection_factory() {
    let users: Collection<UserDto> = UserDto::collection([
        json!({"username": "a", "email": "a@example.com"}),
        json!({"username": "b", "email": "b@example.com"}),
    ])
    .unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users.first().map(|user| user.username.as_str()), Some("a"));

    let err = UserDto::collection([json!("not a map")]).unwrap_err();
    assert!(matches!(err, DtoError::InvalidInput(_)));
}

#[test]
fn test_round_trip_through_to_array() {
    let user = test_user();
    let rebuilt = UserDto::new(user.to_array(3)).unwrap();
    assert_eq!(rebuilt, user);
}

// =============================================================================
// VALIDATION
// =============================================================================

#[test]
fn test_user_validates_successfully() {
    let user = UserDto::from_json(json!({
        "username": "jdoe",
        "email": "jdoe@example.com",
        "firstName": "John",
        "lastName": "Doe",
    }))
    .unwrap();
    assert_eq!(user.validate(true).unwrap(), Validation::Passed);
    assert!(user.is_valid(false).unwrap());
}

#[test]
fn test_validation_returns_errors_without_throwing() {
    let user = UserDto::from_json(json!({"email": "invalid"})).unwrap();
    let validation = user.validate(false).unwrap();
    let errors = validation.errors().expect("validation should fail");
    assert_eq!(errors["username"], ["validation.required"]);
    assert_eq!(errors["email"], ["validation.email"]);
}

#[test]
fn test_validation_failure_can_throw() {
    let user = UserDto::from_json(json!({"email": "invalid"})).unwrap();
    let err = user.validate(true).unwrap_err();
    let errors = err.field_errors().expect("field errors");
    assert_eq!(errors.keys().collect::<Vec<_>>(), ["username", "email"]);

    assert!(!user.is_valid(false).unwrap());
    assert!(matches!(user.is_valid(true), Err(DtoError::ValidationFailed(_))));
}

#[rstest]
#[case(json!({"username": "jdoe", "email": "jdoe@example.com", "firstName": "x".repeat(33)}), "firstName", "validation.max.string")]
#[case(json!({"username": "u".repeat(65), "email": "jdoe@example.com"}), "username", "validation.max.string")]
#[case(json!({"username": "jdoe", "email": ""}), "email", "validation.required")]
fn test_user_rule_failures(#[case] input: serde_json::Value, #[case] field: &str, #[case] message: &str) {
    let user = UserDto::from_json(input).unwrap();
    let validation = user.validate(false).unwrap();
    assert_eq!(validation.errors().unwrap()[field], [message]);
}

#[test]
fn test_missing_rules() {
    let err = OpaqueDto::default().validate(false).unwrap_err();
    assert_eq!(err.to_string(), "OpaqueDto must implement a rules() method for validation");
    assert!(!OpaqueDto::default().is_valid(false).unwrap());
}
