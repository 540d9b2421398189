/// Full replacement of the mutable profile fields.
#[derive(Debug, Clone)]
pub struct UpdateAccountDto {
    pub name: String,
    pub email: String,
}
