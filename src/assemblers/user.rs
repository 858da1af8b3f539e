use crate::framework::{attributes, Assembler, Dto, DtoError, MethodTable, Record, Value};
use crate::model::{FullNameDto, UserDto};

/// Builds users from `display_name` / `first_name` / `last_name` / `email`
/// records.
#[derive(Debug, Default)]
pub struct UserDtoAssembler;

impl UserDtoAssembler {
    pub fn to_user_dto(input: &Record) -> Result<UserDto, DtoError> {
        UserDto::new(attributes([
            ("username", input.value("display_name")),
            ("firstName", input.value("first_name")),
            ("lastName", input.value("last_name")),
            ("email", input.value("email")),
        ]))
    }

    /// Falls back to `username` when neither name part is present.
    pub fn to_full_name_dto(input: &Record) -> Result<FullNameDto, DtoError> {
        let full_name = if input.value("first_name").is_null() && input.value("last_name").is_null() {
            input.value("username")
        } else {
            Value::from(format!("{} {}", input.string("first_name")?, input.string("last_name")?))
        };
        FullNameDto::new(attributes([("fullName", full_name)]))
    }
}

impl Assembler for UserDtoAssembler {
    fn declare(methods: &mut MethodTable<Self>) {
        methods.to(Self::to_user_dto).to(Self::to_full_name_dto);
    }
}

/// Declares its adapter with the `from` prefix only.
#[derive(Debug, Default)]
pub struct FromPatternAssembler;

impl FromPatternAssembler {
    pub fn from_user_dto(input: &Record) -> Result<UserDto, DtoError> {
        UserDto::new(attributes([
            ("username", input.value_or("name", "default-user")),
            ("email", input.value_or("email", "default@example.com")),
            ("firstName", input.value("first_name")),
            ("lastName", input.value("last_name")),
        ]))
    }
}

impl Assembler for FromPatternAssembler {
    fn declare(methods: &mut MethodTable<Self>) {
        methods.from(Self::from_user_dto);
    }
}
