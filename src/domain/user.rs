use serde::{Deserialize, Serialize};

/// Registration form fields. The password fields are never echoed back.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Non-secret form values that survive a failed submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RetainedFields {
    pub username: String,
    pub email: String,
}

impl From<&RegistrationInput> for RetainedFields {
    fn from(input: &RegistrationInput) -> Self {
        Self {
            username: input.username.clone(),
            email: input.email.clone(),
        }
    }
}

impl From<&LoginInput> for RetainedFields {
    fn from(input: &LoginInput) -> Self {
        Self {
            username: String::new(),
            email: input.email.clone(),
        }
    }
}
