use portalmap_model::MapDetail;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn object_id() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9]{0,6}").unwrap()
}

fn object_body() -> impl Strategy<Value = Value> {
    (
        prop_oneof![
            Just(json!("portal")),
            Just(json!("image")),
            (0i64..8).prop_map(|n| json!(n)),
        ],
        -50i64..50,
        -50i64..50,
        proptest::option::of(object_id()),
    )
        .prop_map(|(ty, x, y, target)| {
            let mut obj = json!({"type": ty, "x": x, "y": y});
            if let Some(target) = target {
                obj["targetMap"] = json!(target);
            }
            obj
        })
}

fn unique_objects() -> impl Strategy<Value = Vec<(String, Value)>> {
    proptest::collection::btree_map(object_id(), object_body(), 0..8)
        .prop_map(|m| m.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn mapping_form_parses_like_list_form(objects in unique_objects()) {
        let list: Vec<Value> = objects
            .iter()
            .map(|(id, body)| {
                let mut with_id = body.clone();
                with_id["id"] = json!(id);
                with_id
            })
            .collect();
        let mut mapping = Map::new();
        for (id, body) in &objects {
            mapping.insert(id.clone(), body.clone());
        }

        let from_list = MapDetail::from_document("M", json!({"id": "M", "objects": list})).unwrap();
        let from_mapping =
            MapDetail::from_document("M", json!({"id": "M", "objects": Value::Object(mapping)})).unwrap();

        prop_assert_eq!(from_list.objects, from_mapping.objects);
    }

    #[test]
    fn dump_reparses_to_the_same_objects(objects in unique_objects()) {
        let list: Vec<Value> = objects
            .into_iter()
            .map(|(id, mut body)| {
                body["id"] = json!(id);
                body
            })
            .collect();
        let detail = MapDetail::from_document("M", json!({"id": "M", "objects": list})).unwrap();

        let dumped = serde_json::to_string_pretty(detail.document()).unwrap();
        let reparsed = MapDetail::from_document("M", serde_json::from_str(&dumped).unwrap()).unwrap();

        prop_assert_eq!(reparsed.document(), detail.document());
        prop_assert_eq!(reparsed.objects, detail.objects);
    }
}
