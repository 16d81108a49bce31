//! Annotation lookup over the shared fixture

mod common;

use common::{fixture, AttributeA, AttributeB, DerivedAttributeA, LocalOnly};
use typelens::{get_annotation, get_annotations, has_annotation, ReflectConfig, Reflector};

#[test]
fn test_get_annotation_on_type() {
    let fx = fixture();
    let c = &fx.catalog;
    let test_class = c.get(fx.test_class).unwrap();

    assert_eq!(get_annotation::<AttributeA>(c, test_class, true), Some(&AttributeA("test-class")));
    assert!(get_annotation::<AttributeB>(c, test_class, true).is_none());
}

#[test]
fn test_get_annotations_collects_ancestors() {
    let fx = fixture();
    let c = &fx.catalog;
    let derived_a = c.get(fx.derived_a).unwrap();

    let found = get_annotations::<AttributeA>(c, derived_a, true);
    assert_eq!(found, [&AttributeA("derived-a"), &AttributeA("test-class")]);

    let own = get_annotations::<AttributeA>(c, derived_a, false);
    assert_eq!(own, [&AttributeA("derived-a")]);
}

#[test]
fn test_nearest_annotation_wins() {
    let fx = fixture();
    let c = &fx.catalog;
    let derived_c = c.get(fx.derived_c).unwrap();

    assert_eq!(get_annotation::<AttributeA>(c, derived_c, true), Some(&AttributeA("derived-a")));
    assert!(get_annotation::<AttributeA>(c, derived_c, false).is_none());
    assert_eq!(get_annotations::<AttributeA>(c, derived_c, true).len(), 2);
}

#[test]
fn test_kinds_are_matched_exactly() {
    let fx = fixture();
    let c = &fx.catalog;
    let derived_b = c.get(fx.derived_b).unwrap();

    // DerivedAttributeA is its own kind, never counted as AttributeA
    assert_eq!(get_annotations::<AttributeA>(c, derived_b, true).len(), 1);
    assert_eq!(get_annotations::<DerivedAttributeA>(c, derived_b, true).len(), 1);
}

#[test]
fn test_non_inheritable_kind() {
    let fx = fixture();
    let c = &fx.catalog;

    let test_class = c.get(fx.test_class).unwrap();
    assert_eq!(get_annotation::<LocalOnly>(c, test_class, true), Some(&LocalOnly(1)));

    let derived_a = c.get(fx.derived_a).unwrap();
    assert!(get_annotation::<LocalOnly>(c, derived_a, true).is_none());
    assert!(!has_annotation::<LocalOnly>(c, derived_a));
}

#[test]
fn test_member_annotations() {
    let fx = fixture();
    let c = &fx.catalog;
    let test_class = c.get(fx.test_class).unwrap();

    let name = test_class.member("name").unwrap();
    let found = get_annotations::<AttributeA>(c, name, true);
    assert_eq!(found, [&AttributeA("name-field"), &AttributeA("name-field-again")]);

    let size = test_class.member("Size").unwrap();
    assert!(has_annotation::<AttributeB>(c, size));
    assert!(!has_annotation::<AttributeA>(c, size));
}

#[test]
fn test_has_annotation() {
    let fx = fixture();
    let c = &fx.catalog;
    assert!(has_annotation::<AttributeA>(c, c.get(fx.derived_c).unwrap()));
    assert!(has_annotation::<AttributeB>(c, c.get(fx.derived_c).unwrap()));
    assert!(!has_annotation::<AttributeB>(c, c.get(fx.derived_b).unwrap()));
    assert!(!has_annotation::<AttributeA>(c, c.get(fx.test_struct).unwrap()));
}

#[test]
fn test_reflector_inherit_setting() {
    let fx = fixture();
    let mut config = ReflectConfig::default();
    config.annotations.inherit = false;
    let reflector = Reflector::with_config(fx.catalog.clone(), config);

    let derived_b = reflector.catalog().get(fx.derived_b).unwrap();
    assert!(reflector.annotation::<AttributeA>(derived_b).is_none());
    assert!(reflector.annotations::<AttributeA>(derived_b).is_empty());
    assert!(reflector.has_annotation::<AttributeA>(derived_b));
}
