use crate::framework::{attributes, Assembler, Attributes, Dto, DtoError, FromValue, MethodTable, Record, Value};
use crate::model::{LegacyModel, ProductDto, ProductFeatureDto, ProductReviewDto};

// =============================================================================
// 1. STATIC ASSEMBLER
// =============================================================================

/// Builds products, their parts and legacy models with static adapters only.
#[derive(Debug, Default)]
pub struct ProductDtoAssembler;

impl ProductDtoAssembler {
    pub fn to_product_dto(input: &Record) -> Result<ProductDto, DtoError> {
        ProductDto::new(product_attributes(input))
    }

    pub fn to_product_feature_dto(input: &Record) -> Result<ProductFeatureDto, DtoError> {
        ProductFeatureDto::new(attributes([
            ("name", input.value_or("name", "Unnamed Feature")),
            ("description", input.value("description")),
        ]))
    }

    pub fn to_product_review_dto(input: &Record) -> Result<ProductReviewDto, DtoError> {
        review(input, input.value_or("comment", ""))
    }

    pub fn to_legacy_model(input: &Record) -> Result<LegacyModel, DtoError> {
        Ok(LegacyModel {
            foo: input.string("bar")?,
        })
    }
}

impl Assembler for ProductDtoAssembler {
    fn declare(methods: &mut MethodTable<Self>) {
        methods
            .to(Self::to_product_dto)
            .to(Self::to_product_feature_dto)
            .to(Self::to_product_review_dto)
            .to(Self::to_legacy_model);
    }
}

fn product_attributes(input: &Record) -> Attributes {
    attributes([
        ("title", input.value("product_name")),
        ("user", input.value("user")),
        ("features", input.value_or("features", Value::List(Vec::new()))),
        ("reviews", input.value_or("reviews", Value::List(Vec::new()))),
    ])
}

fn review(input: &Record, comment: Value) -> Result<ProductReviewDto, DtoError> {
    let rating = i64::from_value(input.value_or("rating", 0))?;
    ProductReviewDto::new(attributes([("rating", Value::Int(rating)), ("comment", comment)]))
}

// =============================================================================
// 2. INSTANCE ASSEMBLER
// =============================================================================

/// Stand-in for an injected application service.
#[derive(Debug, Clone, Default)]
pub struct ExampleService;

impl ExampleService {
    pub fn foo(&self) -> String {
        "foo bar".to_string()
    }
}

/// Mixes bound adapters that need an [`ExampleService`] with a static one.
///
/// Bound adapters only run when the assembler instance is supplied, either
/// through [`Assembler::assemble_instance`] or as the `bound` argument.
#[derive(Debug, Default)]
pub struct ProductDtoAssemblerInstance {
    service: ExampleService,
}

impl ProductDtoAssemblerInstance {
    pub fn new(service: ExampleService) -> Self {
        Self { service }
    }

    pub fn to_product_dto(&self, input: &Record) -> Result<ProductDto, DtoError> {
        let mut product = ProductDto::new(product_attributes(input))?;
        product.title = self.service.foo();
        Ok(product)
    }

    pub fn to_product_feature_dto(input: &Record) -> Result<ProductFeatureDto, DtoError> {
        ProductFeatureDto::new(attributes([
            ("name", input.value("name")),
            ("description", input.value("description")),
            ("subFeatures", input.value("subFeatures")),
        ]))
    }

    pub fn to_product_review_dto(&self, input: &Record) -> Result<ProductReviewDto, DtoError> {
        review(input, Value::from(self.service.foo()))
    }

    pub fn to_legacy_model(&self, _input: &Record) -> Result<LegacyModel, DtoError> {
        Ok(LegacyModel {
            foo: self.service.foo(),
        })
    }
}

impl Assembler for ProductDtoAssemblerInstance {
    fn declare(methods: &mut MethodTable<Self>) {
        methods
            .to_bound(Self::to_product_dto)
            .to(Self::to_product_feature_dto)
            .to_bound(Self::to_product_review_dto)
            .to_bound(Self::to_legacy_model);
    }
}
