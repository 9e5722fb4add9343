//! Decides whether a `Menu` element describes a regular or a graphic menu

use super::element::XmlElement;
use super::{attrs, tags};

/// Kind of menu a `Menu` element decodes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSpec {
    Regular,
    Graphic,
}

const MENU_MARKERS: [&str; 3] = [attrs::WIDTH, attrs::HEIGHT, attrs::COLUMNS];
const ENTRY_MARKERS: [&str; 2] = [attrs::IMAGE_PATH, attrs::TOOLTIP];

/// Classify a `Menu` element.
///
/// A menu is graphic when it carries any of the image layout attributes, or
/// when one of its immediate children is a graphic entry or carries entry
/// attributes. Grandchildren are not inspected.
pub fn classify_menu(element: &XmlElement) -> MenuSpec {
    let own = MENU_MARKERS.iter().any(|a| element.has_attr(a));
    let from_children = element.children.iter().any(|child| {
        child.is(tags::GRAPHIC_ENTRY) || ENTRY_MARKERS.iter().any(|a| child.has_attr(a))
    });
    if own || from_children {
        MenuSpec::Graphic
    } else {
        MenuSpec::Regular
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu(xml: &str) -> XmlElement {
        XmlElement::parse(xml).unwrap()
    }

    #[test]
    fn test_plain_menu_is_regular() {
        let m = menu(r#"<Menu Name="Stats"><Function Name="ttest"/><PDF Path="a.pdf"/></Menu>"#);
        assert_eq!(classify_menu(&m), MenuSpec::Regular);
    }

    #[test]
    fn test_layout_attribute_marks_graphic() {
        assert_eq!(classify_menu(&menu(r#"<Menu Name="P" width="64"/>"#)), MenuSpec::Graphic);
        assert_eq!(classify_menu(&menu(r#"<Menu Name="P" Columns="2"/>"#)), MenuSpec::Graphic);
    }

    #[test]
    fn test_entry_children_mark_graphic() {
        let m = menu(r#"<Menu Name="P"><GraphicEntry><Function Name="f"/></GraphicEntry></Menu>"#);
        assert_eq!(classify_menu(&m), MenuSpec::Graphic);
        let m = menu(r#"<Menu Name="P"><Item ToolTip="hover"/></Menu>"#);
        assert_eq!(classify_menu(&m), MenuSpec::Graphic);
    }

    #[test]
    fn test_nested_graphic_menu_does_not_reclassify_parent() {
        let m = menu(
            r#"<Menu Name="Outer"><Menu Name="Inner" Width="64" Height="64" Columns="3"/></Menu>"#,
        );
        assert_eq!(classify_menu(&m), MenuSpec::Regular);
        assert_eq!(classify_menu(&m.children[0]), MenuSpec::Graphic);
    }
}
