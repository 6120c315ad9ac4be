use uuid::Uuid;

// time ordered, url safe, shorter than uuid string form
pub fn random_id() -> String {
    bs58::encode(Uuid::now_v7().as_bytes()).into_string()
}

#[cfg(test)]
mod tests {
    use super::random_id;

    #[test]
    fn ids_are_unique() {
        let first = random_id();
        let second = random_id();
        assert_ne!(first, second, "two generated ids must differ");
    }
}
