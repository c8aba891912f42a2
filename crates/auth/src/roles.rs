use crate::names::named_enum;

named_enum! {
    /// Class of actor. Every user account carries exactly one role.
    ///
    /// Parsed from untrusted input only at the authentication boundary; the
    /// gate and the guard receive this type, never a string.
    pub enum Role : "role" {
        Admin => "admin",
        Restaurant => "restaurant",
        Bank => "bank",
        Supplier => "supplier",
        Marketer => "marketer",
        LandspiceEmployee => "landspice_employee",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
            assert_eq!(
                serde_json::to_string(role).unwrap(),
                format!("\"{}\"", role.as_str())
            );
        }
    }

    #[test]
    fn unknown_role_is_an_error() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "unknown role 'superuser'");
        assert!("Admin".parse::<Role>().is_err());
    }
}
