//! Depth-first serialization of AST trees into the BSON wire encoding.
//!
//! Documents are length-prefixed: the renderer reserves four bytes, writes
//! the elements in insertion order, appends the terminator, then back-patches
//! the little-endian total length. Arrays are documents keyed by base-10
//! indices. Rendering a constructed tree cannot fail and is byte-identical
//! across repeated calls; the only side effect is writes to the supplied
//! buffer.

use bytes::{BufMut, BytesMut};

use super::{AstElement, AstValue};

/// Render an ordered element sequence as one document.
pub fn render_document(elements: &[AstElement], dst: &mut BytesMut) {
    let start = dst.len();
    dst.put_i32_le(0); // Length placeholder
    for element in elements {
        render_element(element, dst);
    }
    dst.put_u8(0); // Document terminator
    patch_length(dst, start);
}

fn render_element(element: &AstElement, dst: &mut BytesMut) {
    // Undefined means absent: neither tag nor name reaches the wire.
    if element.value.is_undefined() {
        return;
    }
    dst.put_u8(element.value.element_type() as u8);
    put_cstring(&element.name, dst);
    render_value(&element.value, dst);
}

fn render_value(value: &AstValue, dst: &mut BytesMut) {
    match value {
        AstValue::Double(v) => dst.put_f64_le(*v),
        AstValue::String(s) => put_string(s, dst),
        AstValue::Document(elements) => render_document(elements, dst),
        AstValue::Array(values) => render_array(values, dst),
        AstValue::Binary { subtype, bytes } => {
            dst.put_i32_le(bytes.len() as i32);
            dst.put_u8(*subtype);
            dst.put_slice(bytes);
        }
        AstValue::Undefined => unreachable!("undefined elements are skipped before dispatch"),
        AstValue::ObjectId(oid) => dst.put_slice(oid),
        AstValue::Boolean(v) => dst.put_u8(*v as u8),
        AstValue::DateTime(millis) => dst.put_i64_le(*millis),
        AstValue::Null => {}
        AstValue::Int32(v) => dst.put_i32_le(*v),
        AstValue::Int64(v) => dst.put_i64_le(*v),
    }
}

fn render_array(values: &[AstValue], dst: &mut BytesMut) {
    let start = dst.len();
    dst.put_i32_le(0);
    // Undefined entries are skipped and the remaining indices renumbered so
    // the rendered array stays dense.
    let mut index = 0usize;
    let mut key = [0u8; 20];
    for value in values {
        if value.is_undefined() {
            continue;
        }
        dst.put_u8(value.element_type() as u8);
        let written = write_index(index, &mut key);
        dst.put_slice(written);
        dst.put_u8(0);
        render_value(value, dst);
        index += 1;
    }
    dst.put_u8(0);
    patch_length(dst, start);
}

fn patch_length(dst: &mut BytesMut, start: usize) {
    let total = (dst.len() - start) as i32;
    dst[start..start + 4].copy_from_slice(&total.to_le_bytes());
}

fn put_cstring(s: &str, dst: &mut BytesMut) {
    dst.put_slice(s.as_bytes());
    dst.put_u8(0);
}

fn put_string(s: &str, dst: &mut BytesMut) {
    dst.put_i32_le(s.len() as i32 + 1); // Includes trailing NUL
    dst.put_slice(s.as_bytes());
    dst.put_u8(0);
}

// Formats an array index without allocating.
fn write_index(mut index: usize, buf: &mut [u8; 20]) -> &[u8] {
    if index == 0 {
        buf[0] = b'0';
        return &buf[..1];
    }
    let mut pos = buf.len();
    while index > 0 {
        pos -= 1;
        buf[pos] = b'0' + (index % 10) as u8;
        index /= 10;
    }
    buf.copy_within(pos.., 0);
    let len = 20 - pos;
    &buf[..len]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstElement;

    fn doc(elements: Vec<AstElement>) -> Vec<u8> {
        let mut buf = BytesMut::new();
        render_document(&elements, &mut buf);
        buf.to_vec()
    }

    fn el(name: &str, value: AstValue) -> AstElement {
        AstElement::new(name, value).unwrap()
    }

    #[test]
    fn test_empty_document_is_five_bytes() {
        assert_eq!(doc(vec![]), vec![5, 0, 0, 0, 0]);
    }

    #[test]
    fn test_ok_double_golden_bytes() {
        // { "ok": 1.0 } as seen on the wire: 4 length + 1 tag + 3 name
        // + 8 double + 1 terminator = 17 bytes.
        let expected = vec![
            0x11, 0x00, 0x00, 0x00, // document length
            0x01, b'o', b'k', 0x00, // double "ok"
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf0, 0x3f, // 1.0
            0x00, // terminator
        ];
        let rendered = doc(vec![el("ok", AstValue::Double(1.0))]);
        assert_eq!(rendered, expected);

        // The declared length must equal the rendered size, and the bytes
        // must be readable by a conformant parser.
        let declared = i32::from_le_bytes(rendered[0..4].try_into().unwrap());
        assert_eq!(declared as usize, rendered.len());
        let parsed = bson::Document::from_reader(&rendered[..]).unwrap();
        assert_eq!(parsed.get_f64("ok").unwrap(), 1.0);
    }

    #[test]
    fn test_undefined_is_absent_null_is_present() {
        let rendered = doc(vec![
            el("gone", AstValue::Undefined),
            el("kept", AstValue::Null),
        ]);
        let parsed = bson::Document::from_reader(&rendered[..]).unwrap();
        let names: Vec<&str> = parsed.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["kept"]);
        assert_eq!(parsed.get("kept"), Some(&bson::Bson::Null));
    }

    #[test]
    fn test_render_is_idempotent() {
        let elements = vec![
            el("s", AstValue::String("text".into())),
            el("n", AstValue::Int64(-7)),
            el(
                "inner",
                AstValue::Document(vec![el("b", AstValue::Boolean(true))]),
            ),
        ];
        let mut first = BytesMut::new();
        let mut second = BytesMut::new();
        render_document(&elements, &mut first);
        render_document(&elements, &mut second);
        assert_eq!(first, second);
    }

    #[test]
    fn test_array_skips_undefined_and_renumbers() {
        let rendered = doc(vec![el(
            "xs",
            AstValue::Array(vec![
                AstValue::Int32(1),
                AstValue::Undefined,
                AstValue::Int32(3),
            ]),
        )]);
        let parsed = bson::Document::from_reader(&rendered[..]).unwrap();
        let xs = parsed.get_array("xs").unwrap();
        assert_eq!(xs.len(), 2);
        assert_eq!(xs[0], bson::Bson::Int32(1));
        assert_eq!(xs[1], bson::Bson::Int32(3));
    }

    #[test]
    fn test_round_trip_preserves_field_order_and_values() {
        let elements = vec![
            el("a", AstValue::Int32(1)),
            el("z", AstValue::String("last".into())),
            el("m", AstValue::Double(2.5)),
            el("flag", AstValue::Boolean(false)),
            el("when", AstValue::DateTime(1_700_000_000_000)),
        ];
        let rendered = doc(elements);
        let parsed = bson::Document::from_reader(&rendered[..]).unwrap();
        let names: Vec<&str> = parsed.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["a", "z", "m", "flag", "when"]);
        assert_eq!(parsed.get_i32("a").unwrap(), 1);
        assert_eq!(parsed.get_str("z").unwrap(), "last");
        assert_eq!(parsed.get_f64("m").unwrap(), 2.5);
        assert!(!parsed.get_bool("flag").unwrap());
    }

    #[test]
    fn test_nested_field_names_only_unique_per_level() {
        // Same name at different nesting levels is legal.
        let rendered = doc(vec![
            el("x", AstValue::Int32(1)),
            el("inner", AstValue::Document(vec![el("x", AstValue::Int32(2))])),
        ]);
        let parsed = bson::Document::from_reader(&rendered[..]).unwrap();
        assert_eq!(parsed.get_i32("x").unwrap(), 1);
        assert_eq!(
            parsed.get_document("inner").unwrap().get_i32("x").unwrap(),
            2
        );
    }

    #[test]
    fn test_binary_and_object_id_round_trip() {
        let oid = [
            0x65, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa,
        ];
        let rendered = doc(vec![
            el("id", AstValue::ObjectId(oid)),
            el(
                "blob",
                AstValue::Binary {
                    subtype: 0x00,
                    bytes: vec![1, 2, 3],
                },
            ),
        ]);
        let parsed = bson::Document::from_reader(&rendered[..]).unwrap();
        assert_eq!(parsed.get_object_id("id").unwrap().bytes(), oid);
        match parsed.get("blob") {
            Some(bson::Bson::Binary(b)) => assert_eq!(b.bytes, vec![1, 2, 3]),
            other => panic!("expected binary, got {:?}", other),
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn scalar() -> impl Strategy<Value = AstValue> {
            prop_oneof![
                any::<i32>().prop_map(AstValue::Int32),
                any::<i64>().prop_map(AstValue::Int64),
                any::<bool>().prop_map(AstValue::Boolean),
                // Finite doubles only: NaN breaks value equality, not rendering.
                (-1.0e12f64..1.0e12).prop_map(AstValue::Double),
                "[a-z]{0,16}".prop_map(AstValue::String),
                Just(AstValue::Null),
            ]
        }

        proptest! {
            #[test]
            fn prop_scalar_documents_round_trip(
                fields in proptest::collection::vec(("[a-z][a-z0-9]{0,8}", scalar()), 0..12)
            ) {
                // Dedup names: uniqueness within a document is a caller invariant.
                let mut seen = std::collections::HashSet::new();
                let elements: Vec<AstElement> = fields
                    .into_iter()
                    .filter(|(name, _)| seen.insert(name.clone()))
                    .map(|(name, value)| AstElement::new(name, value).unwrap())
                    .collect();

                let mut buf = BytesMut::new();
                render_document(&elements, &mut buf);
                let parsed = bson::Document::from_reader(&buf[..]).unwrap();

                let names: Vec<&str> = parsed.keys().map(|k| k.as_str()).collect();
                let expected: Vec<&str> = elements.iter().map(|e| e.name.as_str()).collect();
                prop_assert_eq!(names, expected);
            }

            #[test]
            fn prop_render_twice_is_byte_identical(
                fields in proptest::collection::vec(("[a-z][a-z0-9]{0,8}", scalar()), 0..12)
            ) {
                let elements: Vec<AstElement> = fields
                    .into_iter()
                    .map(|(name, value)| AstElement::new(name, value).unwrap())
                    .collect();
                let mut a = BytesMut::new();
                let mut b = BytesMut::new();
                render_document(&elements, &mut a);
                render_document(&elements, &mut b);
                prop_assert_eq!(a, b);
            }
        }
    }
}
