#[derive(Debug, Clone)]
pub struct CreateAccountDto {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}
