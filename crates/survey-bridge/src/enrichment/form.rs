use url::form_urlencoded;

/// A flat key/value result the survey platform reads as a form-encoded body.
pub trait FormFields {
    fn form_fields(&self) -> Vec<(&'static str, &str)>;

    fn to_form(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.form_fields() {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pairs(Vec<(&'static str, String)>);

    impl FormFields for Pairs {
        fn form_fields(&self) -> Vec<(&'static str, &str)> {
            self.0.iter().map(|(key, value)| (*key, value.as_str())).collect()
        }
    }

    #[test]
    fn encodes_like_a_submitted_form() {
        let pairs = Pairs(vec![
            ("blank_value", String::new()),
            ("region", "Yorkshire and The Humber".to_string()),
            ("cat_a", "Roads & paths".to_string()),
        ]);

        assert_eq!(
            pairs.to_form(),
            "blank_value=&region=Yorkshire+and+The+Humber&cat_a=Roads+%26+paths"
        );
    }
}
