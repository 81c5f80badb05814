#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use crate::{base64_url, clamp_limit, CursorV1, Error, LimitCfg, Page, StartKey};

    fn key(pairs: &[(&str, &str)]) -> StartKey {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_cursor_v1_encode_decode_round_trip() {
        let cursor = CursorV1::new(
            "gsi1",
            "AUTHOR#u1",
            key(&[
                ("GSI1PK", "AUTHOR#u1"),
                ("GSI1SK", "RECIPE#0002"),
                ("PK", "RECIPE"),
                ("SK", "RECIPE#0002"),
            ]),
        );

        let encoded = cursor.encode();
        let decoded = CursorV1::decode(&encoded).expect("decode should succeed");
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn test_cursor_is_url_safe() {
        let cursor = CursorV1::new("gsi2", "CUISINE#Thai/Lao?", key(&[("SK", "RECIPE#+/=")]));
        let encoded = cursor.encode();
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_cursor_v1_decode_invalid_base64() {
        let result = CursorV1::decode("invalid_base64!");
        assert_eq!(result, Err(Error::CursorInvalidBase64));
    }

    #[test]
    fn test_cursor_v1_decode_invalid_json() {
        let invalid_json = base64_url::encode(b"not_json");
        let result = CursorV1::decode(&invalid_json);
        assert_eq!(result, Err(Error::CursorInvalidJson));
    }

    #[test]
    fn test_cursor_v1_decode_invalid_version() {
        let cursor_data = serde_json::json!({
            "v": 2,
            "i": "primary",
            "p": "RECIPE",
            "k": {"SK": "RECIPE#1"}
        });
        let encoded = base64_url::encode(serde_json::to_vec(&cursor_data).unwrap().as_slice());
        let result = CursorV1::decode(&encoded);
        assert_eq!(result, Err(Error::CursorInvalidVersion));
    }

    #[test]
    fn test_cursor_v1_decode_empty_keys() {
        let cursor_data = serde_json::json!({
            "v": 1,
            "i": "primary",
            "p": "RECIPE",
            "k": {}
        });
        let encoded = base64_url::encode(serde_json::to_vec(&cursor_data).unwrap().as_slice());
        let result = CursorV1::decode(&encoded);
        assert_eq!(result, Err(Error::CursorInvalidKeys));
    }

    #[test]
    fn test_cursor_v1_decode_empty_index() {
        let cursor_data = serde_json::json!({
            "v": 1,
            "i": "",
            "p": "RECIPE",
            "k": {"SK": "RECIPE#1"}
        });
        let encoded = base64_url::encode(serde_json::to_vec(&cursor_data).unwrap().as_slice());
        assert_eq!(CursorV1::decode(&encoded), Err(Error::CursorInvalidIndex));
    }

    #[test]
    fn test_decode_for_rejects_other_partition() {
        let encoded = CursorV1::new("gsi1", "AUTHOR#a", key(&[("SK", "RECIPE#1")])).encode();

        assert!(CursorV1::decode_for(&encoded, "gsi1", "AUTHOR#a").is_ok());
        assert_eq!(
            CursorV1::decode_for(&encoded, "gsi1", "AUTHOR#b"),
            Err(Error::CursorMismatch)
        );
        assert_eq!(
            CursorV1::decode_for(&encoded, "gsi2", "AUTHOR#a"),
            Err(Error::CursorMismatch)
        );
    }

    #[test]
    fn test_clamp_limit() {
        let cfg = LimitCfg::new(20, 100);
        assert_eq!(clamp_limit(None, cfg), 20);
        assert_eq!(clamp_limit(Some(0), cfg), 1);
        assert_eq!(clamp_limit(Some(7), cfg), 7);
        assert_eq!(clamp_limit(Some(500), cfg), 100);
    }

    #[test]
    fn test_from_overfetch_emits_cursor_only_when_more_rows_exist() {
        let page = Page::from_overfetch(vec![1, 2, 3, 4], 3, |last| Some(format!("after-{last}")));
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.page_info.next_cursor.as_deref(), Some("after-3"));
        assert_eq!(page.page_info.limit, 3);

        let page = Page::from_overfetch(vec![1, 2, 3], 3, |last| Some(format!("after-{last}")));
        assert_eq!(page.items, vec![1, 2, 3]);
        assert!(page.page_info.next_cursor.is_none());

        let page: Page<i32> = Page::from_overfetch(vec![], 3, |_| Some("x".into()));
        assert!(page.items.is_empty());
        assert!(page.page_info.next_cursor.is_none());
    }

    #[test]
    fn test_filter_map_items_preserves_page_info() {
        let page = Page::from_overfetch(vec![1, 2, 3], 2, |last| Some(last.to_string()));
        let mapped = page.filter_map_items(|n| (n % 2 == 0).then_some(n * 10));
        assert_eq!(mapped.items, vec![20]);
        assert_eq!(mapped.page_info.next_cursor.as_deref(), Some("2"));
    }
}
