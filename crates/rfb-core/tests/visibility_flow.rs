//! Integration tests for the derived `has_visible_views` property.

mod common;

use common::Harness;
use rfb_core::{Property, PropertyValue};

#[test]
fn test_has_visible_views_is_written_only_on_transitions() {
    // Arrange
    let mut h = Harness::new();
    let a = h.surfaces.attach();
    let b = h.surfaces.attach();
    let c = h.surfaces.attach();
    h.rfb.start();

    // Act – [true,false,false], unchanged recompute, then [false,false,false]
    h.rfb
        .on_visibility_change(&[(a, true), (b, false), (c, false)]);
    h.rfb.on_visibility_change(&[(a, true)]);
    h.rfb.on_visibility_change(&[(a, false)]);

    // Assert
    assert_eq!(
        h.properties.writes_of(Property::HasVisibleViews),
        vec![PropertyValue::Flag(true), PropertyValue::Flag(false)]
    );
    assert!(!h.rfb.has_visible_views());
}

#[test]
fn test_detaching_the_only_visible_surface_clears_the_flag() {
    // Arrange
    let mut h = Harness::new();
    let a = h.surfaces.attach();
    let b = h.surfaces.attach();
    h.rfb.start();
    h.rfb.on_visibility_change(&[(a, true)]);

    // Act
    h.surfaces.detach(a);
    h.rfb.surface_detached(a);
    h.advance(10);

    // Assert
    assert_eq!(
        h.properties.writes_of(Property::HasVisibleViews),
        vec![PropertyValue::Flag(true), PropertyValue::Flag(false)]
    );
    h.rfb.on_visibility_change(&[(b, true)]);
    assert!(h.rfb.has_visible_views());
}

#[test]
fn test_visibility_of_unregistered_surface_is_ignored() {
    let mut h = Harness::new();
    h.rfb.start();
    let unregistered = h.surfaces.attach();

    h.rfb.on_visibility_change(&[(unregistered, true)]);

    assert!(h.properties.writes_of(Property::HasVisibleViews).is_empty());
}
