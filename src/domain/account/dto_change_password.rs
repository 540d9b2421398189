#[derive(Debug, Clone)]
pub struct ChangePasswordDto {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}
