use chrono::NaiveDate;

/// Role record.
///
/// `Role::default()` is the zero value returned by lookups that match
/// nothing: every field unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Role {
    /// Assigned by storage on insert.
    pub id: Option<i64>,
    /// Unique business key.
    pub name: Option<String>,
}

impl Role {
    pub const ID: &'static str = "id";
    pub const NAME: &'static str = "name";

    pub fn new(id: Option<i64>, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }

    /// A role not yet stored.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(None, name)
    }

    /// True for the zero value.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// User record.
///
/// `password` is stored as given. `User::default()` is the zero value
/// returned by lookups that match nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub id: Option<i64>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub role_id: Option<i64>,
}

impl User {
    pub const ID: &'static str = "id";
    pub const LOGIN: &'static str = "login";
    pub const PASSWORD: &'static str = "password";
    pub const EMAIL: &'static str = "email";
    pub const FIRST_NAME: &'static str = "first_name";
    pub const LAST_NAME: &'static str = "last_name";
    pub const BIRTHDAY: &'static str = "birthday";
    pub const ROLE_ID: &'static str = "role_id";

    /// A user not yet stored.
    pub fn new(
        login: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birthday: NaiveDate,
        role_id: i64,
    ) -> Self {
        Self {
            id: None,
            login: Some(login.into()),
            password: Some(password.into()),
            email: Some(email.into()),
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            birthday: Some(birthday),
            role_id: Some(role_id),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// True for the zero value.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
