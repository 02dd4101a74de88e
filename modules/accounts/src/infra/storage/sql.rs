//! Statements issued by the repositories. Placeholders are positional.

pub(crate) const INSERT_ROLE: &str = "INSERT INTO role(name) VALUES (?)";
pub(crate) const UPDATE_ROLE: &str = "UPDATE role SET name = ? WHERE id = ?";
pub(crate) const DELETE_ROLE: &str = "DELETE FROM role WHERE id = ?";
pub(crate) const DELETE_USERS_BY_ROLE: &str = "DELETE FROM user WHERE role_id = ?";
pub(crate) const SELECT_ROLE_BY_NAME: &str = "SELECT * FROM role WHERE name = ?";

pub(crate) const INSERT_USER: &str = concat!(
    "INSERT INTO user(login, password, email, first_name, last_name, birthday, role_id) ",
    "VALUES (?, ?, ?, ?, ?, ?, ?)"
);
pub(crate) const UPDATE_USER: &str = concat!(
    "UPDATE user SET login=?, password=?, email=?, first_name=?, last_name=?, ",
    "birthday=?, role_id=? WHERE id=?"
);
pub(crate) const DELETE_USER: &str = "DELETE FROM user WHERE id = ?";
pub(crate) const SELECT_USERS: &str = "SELECT * FROM user";
pub(crate) const SELECT_USER_BY_LOGIN: &str = "SELECT * FROM user WHERE login = ?";
pub(crate) const SELECT_USER_BY_EMAIL: &str = "SELECT * FROM user WHERE email = ?";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_statements() {
        assert_eq!(INSERT_ROLE, "INSERT INTO role(name) VALUES (?)");
        assert_eq!(UPDATE_ROLE, "UPDATE role SET name = ? WHERE id = ?");
        assert_eq!(DELETE_ROLE, "DELETE FROM role WHERE id = ?");
        assert_eq!(DELETE_USERS_BY_ROLE, "DELETE FROM user WHERE role_id = ?");
        assert_eq!(SELECT_ROLE_BY_NAME, "SELECT * FROM role WHERE name = ?");
    }

    #[test]
    fn test_user_statements() {
        assert_eq!(
            INSERT_USER,
            "INSERT INTO user(login, password, email, first_name, last_name, birthday, role_id) VALUES (?, ?, ?, ?, ?, ?, ?)"
        );
        assert_eq!(
            UPDATE_USER,
            "UPDATE user SET login=?, password=?, email=?, first_name=?, last_name=?, birthday=?, role_id=? WHERE id=?"
        );
        assert_eq!(DELETE_USER, "DELETE FROM user WHERE id = ?");
        assert_eq!(SELECT_USERS, "SELECT * FROM user");
        assert_eq!(SELECT_USER_BY_LOGIN, "SELECT * FROM user WHERE login = ?");
        assert_eq!(SELECT_USER_BY_EMAIL, "SELECT * FROM user WHERE email = ?");
    }
}
