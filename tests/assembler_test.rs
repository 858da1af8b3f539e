use std::sync::Arc;

use argonaut::assemblers::{
    ExampleService, FromPatternAssembler, ProductDtoAssembler, ProductDtoAssemblerInstance, UserDtoAssembler,
};
use argonaut::framework::{
    attributes, method_cache, Assembler, CastDirective, Collection, Dto, DtoError, Schema, TypeKey, Value,
};
use argonaut::lifecycle::try_setup_tracing;
use argonaut::model::{
    FullNameDto, LegacyModel, ProductDto, ProductFeatureDto, ProductReviewDto, UserDto,
};
use once_cell::sync::Lazy;
use serde_json::json;

/// Product whose features and reviews are routed through `ProductDtoAssembler`.
/// Features are kept as raw values so scalar elements stay visible.
#[derive(Debug, Default)]
struct DelegatingProductDto {
    features: Vec<Value>,
    reviews: Collection<Arc<ProductReviewDto>>,
}

static DELEGATING_SCHEMA: Lazy<Schema<DelegatingProductDto>> = Lazy::new(|| {
    Schema::<DelegatingProductDto>::mutable()
        .field("features", |d| &d.features, |d| &mut d.features)
        .field("reviews", |d| &d.reviews, |d| &mut d.reviews)
        .cast("features", CastDirective::array_of::<ProductFeatureDto>())
        .cast("reviews", CastDirective::collection_of::<ProductReviewDto>())
        .nested_assembler::<ProductDtoAssembler>("features")
        .nested_assembler::<ProductDtoAssembler>("reviews")
});

impl Dto for DelegatingProductDto {
    fn schema() -> &'static Schema<Self> {
        &DELEGATING_SCHEMA
    }
}

struct UnknownType;

#[test]
fn test_assembles_single_dto() {
    try_setup_tracing();
    let product: ProductDto = ProductDtoAssembler::assemble(
        json!({
            "product_name": "Standing Desk",
            "user": {"display_name": "Test-user", "email": "testuser@test.com"},
            "features": [{"name": "Height Adjustable", "description": "The standing desk moves up and down!"}],
            "reviews": [{"displayName": "Test-user", "rating": 5, "comment": "Excellent!"}],
        }),
        None,
    )
    .expect("Failed to assemble product");

    assert_eq!(product.title, "Standing Desk");
    assert_eq!(product.user.as_ref().map(|user| user.username.as_str()), Some("Test-user"));
    assert_eq!(product.features.len(), 1);
    assert_eq!(product.reviews.len(), 1);
    assert_eq!(product.reviews[0].display_name.as_deref(), Some("Test-user"));
    assert!(product.is_valid(false).unwrap());
}

#[test]
fn test_assembles_array_to_collection() {
    let reviews: Collection<ProductReviewDto> = ProductDtoAssembler::from_array(
        vec![
            json!({"rating": 4, "comment": "Good!"}).into(),
            json!({"rating": 5, "comment": "Perfect!"}).into(),
        ],
        None,
    )
    .unwrap();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[1].comment.as_deref(), Some("Perfect!"));
}

#[test]
fn test_assembles_collection_of_dtos_from_collection_inputs() {
    let raw: Collection<Value> = (1..=3)
        .map(|i| {
            Value::from(json!({
                "product_name": format!("product-{i}.example"),
                "user": {"display_name": "Test-user", "email": "testuser@test.com"},
                "features": [{"name": "Height Adjustable"}],
                "reviews": [{"displayName": "Test-user", "rating": i, "comment": "Was okay"}],
            }))
        })
        .collect();

    let products: Collection<ProductDto> = ProductDtoAssembler::from_collection(raw, None).unwrap();
    assert_eq!(products.len(), 3);
    for (i, product) in products.iter().enumerate() {
        assert_eq!(product.title, format!("product-{}.example", i + 1));
        assert_eq!(product.reviews[0].rating, i as i64 + 1);
    }
    assert_eq!(products[0].user.as_ref().unwrap().username, "Test-user");
}

#[test]
fn test_unknown_target_is_missing_assembly_method() {
    let err = UserDtoAssembler::assemble_model(Value::Map(Default::default()), TypeKey::of::<UnknownType>(), None)
        .unwrap_err();
    assert_eq!(
        err,
        DtoError::MissingAssemblyMethod {
            to_method: "toUnknownType".into(),
            from_method: "fromUnknownType".into(),
            target: "UnknownType".into(),
            assembler: "UserDtoAssembler".into(),
        }
    );
}

#[test]
fn test_user_assembler_multiple_methods() {
    let input = json!({
        "display_name": "Test-user",
        "email": "testuser@test.com",
        "first_name": "Test",
        "last_name": "User",
    });

    let user: UserDto = UserDtoAssembler::assemble(input.clone(), None).unwrap();
    assert_eq!(user.username, "Test-user");
    assert_eq!(user.full_name.as_deref(), Some("Test User"));

    let full_name: FullNameDto = UserDtoAssembler::assemble_from_record_map(
        attributes([("first_name", Value::from("Test")), ("last_name", Value::from("User"))]),
        None,
    )
    .unwrap();
    assert_eq!(full_name.full_name, "Test User");
}

#[test]
fn test_assembles_from_objects() {
    let source = UserDto::from_json(json!({"username": "jdoe", "email": "jdoe@example.com"})).unwrap();
    let full_name: FullNameDto = UserDtoAssembler::assemble(Value::model(source), None).unwrap();
    assert_eq!(full_name.full_name, "jdoe");
}

#[test]
fn test_scalar_input_is_rejected() {
    let err = UserDtoAssembler::assemble::<UserDto>("not a record", None).unwrap_err();
    assert!(matches!(err, DtoError::InvalidInput(_)));
}

#[test]
fn test_invalid_input_for_dto_assembling() {
    let err = ProductDtoAssembler::assemble::<ProductDto>(
        json!({
            "product_name": "Standing Desk",
            "user": {"username": "Test-user", "email": "invalid-email"},
            "features": null,
            "reviews": "invalid-reviews",
        }),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, DtoError::InvalidInput(_)));
}

#[test]
fn test_assembles_non_dto_targets() {
    let model: LegacyModel = ProductDtoAssembler::assemble(json!({"bar": "Foo Bar"}), None).unwrap();
    assert_eq!(model.foo, "Foo Bar");
}

#[test]
fn test_assemble_and_assemble_instance() {
    let service = ExampleService;
    let assembler = ProductDtoAssemblerInstance::new(service.clone());
    let input = json!({"bar": "not foo bar"});

    let model: LegacyModel = ProductDtoAssemblerInstance::assemble(input.clone(), Some(&assembler)).unwrap();
    assert_eq!(model.foo, service.foo());

    let model: LegacyModel = assembler.assemble_instance(input).unwrap();
    assert_eq!(model.foo, service.foo());
}

#[test]
fn test_cannot_call_bound_method_without_instance() {
    let input = json!({
        "name": "Desk",
        "subFeatures": [{"name": "Foldable", "description": "Folds with ease!"}],
    });

    let feature: ProductFeatureDto = ProductDtoAssemblerInstance::assemble(input.clone(), None).unwrap();
    assert_eq!(feature.name, "Desk");
    let sub_features = feature.sub_features.expect("subFeatures");
    assert_eq!(sub_features.len(), 1);
    assert_eq!(sub_features[0].name, "Foldable");

    let err = ProductDtoAssemblerInstance::assemble::<LegacyModel>(input, None).unwrap_err();
    assert_eq!(
        err,
        DtoError::UnboundMethodCall {
            method: "toLegacyModel".into(),
            assembler: "ProductDtoAssemblerInstance".into(),
        }
    );
}

#[test]
fn test_nested_assembler_for_array_cast_field() {
    let dto = DelegatingProductDto::new(attributes([
        (
            "features",
            Value::List(vec![
                Value::model(LegacyModel { foo: "No name description".into() }),
                Value::from(json!({"description": "Another no name"})),
                Value::from("plain"),
                Value::Int(7),
            ]),
        ),
        ("reviews", Value::List(Vec::new())),
    ]))
    .unwrap();

    assert_eq!(dto.features.len(), 4);
    for feature in &dto.features[..2] {
        let feature = feature.downcast_ref::<ProductFeatureDto>().expect("assembled feature");
        assert_eq!(feature.name, "Unnamed Feature");
    }
    assert_eq!(dto.features[1].downcast_ref::<ProductFeatureDto>().unwrap().description.as_deref(), Some("Another no name"));
    assert_eq!(dto.features[2], Value::from("plain"));
    assert_eq!(dto.features[3], Value::Int(7));
}

#[test]
fn test_nested_assembler_with_collection_value() {
    let source = ProductReviewDto::new(attributes([("rating", Value::Int(4))])).unwrap();
    let dto = DelegatingProductDto::new(attributes([
        ("features", Value::List(Vec::new())),
        (
            "reviews",
            Value::Collection(vec![Value::from(json!({"rating": 3})), Value::model(source)]),
        ),
    ]))
    .unwrap();

    assert_eq!(dto.reviews.len(), 2);
    let ratings: Vec<i64> = dto.reviews.iter().map(|review| review.rating).collect();
    assert_eq!(ratings, [3, 4]);
    assert!(dto.reviews.iter().all(|review| review.comment.as_deref() == Some("")));
}

#[test]
fn test_assembler_resolves_from_method_pattern() {
    let user: UserDto =
        FromPatternAssembler::assemble(json!({"name": "test-user", "email": "test@example.com"}), None).unwrap();
    assert_eq!(user.username, "test-user");
    assert_eq!(user.email, "test@example.com");

    let users: Collection<UserDto> = FromPatternAssembler::from_array(
        vec![
            json!({"name": "user1", "email": "user1@example.com"}).into(),
            json!({"name": "user2", "email": "user2@example.com"}).into(),
        ],
        None,
    )
    .unwrap();
    let names: Vec<&str> = users.iter().map(|user| user.username.as_str()).collect();
    assert_eq!(names, ["user1", "user2"]);
}

#[test]
fn test_resolution_is_cached_per_pair() {
    let _: FullNameDto = UserDtoAssembler::assemble(json!({"username": "a"}), None).unwrap();
    let first = method_cache().get(
        TypeKey::of::<UserDtoAssembler>().id(),
        TypeKey::of::<FullNameDto>().id(),
    );
    let _: FullNameDto = UserDtoAssembler::assemble(json!({"username": "b"}), None).unwrap();
    let second = method_cache().get(
        TypeKey::of::<UserDtoAssembler>().id(),
        TypeKey::of::<FullNameDto>().id(),
    );
    assert_eq!(first.as_deref(), Some("toFullNameDto"));
    assert_eq!(first, second);
}
