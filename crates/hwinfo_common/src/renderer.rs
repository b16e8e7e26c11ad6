//! Generic Tree Renderer - nested inventory data to a labeled tree.
//!
//! Pure and deterministic: no probing, no I/O besides translation
//! diagnostics. Every input shape yields a (possibly empty) node list.
//!
//! Shape rules:
//! - scalar: single leaf, label translated
//! - list: one node per element, input order kept
//! - map: one node per entry, sorted by label

use crate::classnames::{ClassTable, DeviceClasses};
use crate::labels::{self, label_of, MODULES_LABEL, PLACEHOLDER};
use crate::raw_value::{RawMap, RawValue, Scalar};
use crate::tree::{sort_by_label, TreeNode};
use once_cell::sync::Lazy;

static BUILTIN_CLASSES: Lazy<ClassTable> = Lazy::new(ClassTable::builtin);

/// Render with the built-in device class table.
pub fn render(node: &RawValue) -> Vec<TreeNode> {
    TreeRenderer::new(&*BUILTIN_CLASSES).render(node)
}

/// Renderer bound to a device class lookup.
#[derive(Clone, Copy)]
pub struct TreeRenderer<'a> {
    classes: &'a dyn DeviceClasses,
}

impl<'a> TreeRenderer<'a> {
    pub fn new(classes: &'a dyn DeviceClasses) -> Self {
        Self { classes }
    }

    /// Renderer using the built-in class table.
    pub fn builtin() -> TreeRenderer<'static> {
        TreeRenderer::new(&*BUILTIN_CLASSES)
    }

    pub fn render(&self, node: &RawValue) -> Vec<TreeNode> {
        match unwrap_single_entry(node) {
            RawValue::Empty => Vec::new(),
            RawValue::Scalar(scalar) => vec![TreeNode::leaf(label_of(&scalar.to_string()))],
            RawValue::List(items) => self.render_list(items),
            RawValue::Map(map) => self.render_map(map),
        }
    }

    fn render_list(&self, items: &[RawValue]) -> Vec<TreeNode> {
        items
            .iter()
            .map(|item| match item {
                RawValue::Scalar(scalar) => TreeNode::leaf(scalar.to_string()),
                RawValue::Map(map) => {
                    let repr = self.representative(map);
                    let label = if repr.is_empty() {
                        PLACEHOLDER.to_string()
                    } else {
                        repr
                    };
                    TreeNode::branch(label, self.render(item))
                }
                other => TreeNode::branch(PLACEHOLDER, self.render(other)),
            })
            .collect()
    }

    fn render_map(&self, map: &RawMap) -> Vec<TreeNode> {
        let map = self.translate_classes(map);

        let mut nodes: Vec<TreeNode> = map
            .iter()
            .map(|(key, value)| {
                let rewritten = if key == "modules" {
                    modprobe_lines(value)
                } else {
                    None
                };
                let value = rewritten.as_ref().unwrap_or(value);

                match value {
                    // `[]` and `{}` count as empty, like a missing value
                    RawValue::Scalar(_) => TreeNode::leaf(labels::key_value_label(key, value)),
                    _ if value.is_empty() => TreeNode::leaf(labels::key_value_label(key, value)),
                    _ if is_single_empty_string(value) => TreeNode::leaf(label_of(key)),
                    _ => TreeNode::branch(label_of(key), self.render(value)),
                }
            })
            .collect();

        sort_by_label(&mut nodes);
        nodes
    }

    /// One-line label for a map shown as a list item. Empty if no
    /// representative key is present.
    pub fn representative(&self, map: &RawMap) -> String {
        for &key in labels::representative_order() {
            let Some(value) = map.get(key) else {
                continue;
            };

            return match key {
                "start" => format!("{:#x}", value.as_int().unwrap_or(0)),
                "modules" => MODULES_LABEL.to_string(),
                "width" => resolution(map),
                "sub_class_id" => self.subclass_name(map),
                "device" => device_label(map),
                _ => label_of(&value.stringify()),
            };
        }

        String::new()
    }

    /// Copy of `map` with numeric class ids replaced by their names.
    fn translate_classes(&self, map: &RawMap) -> RawMap {
        let mut out = map.clone();

        if let Some(class_id) = map.get("class_id").and_then(RawValue::as_int) {
            out.insert("class_id".to_string(), RawValue::str(self.classes.resolve_class(class_id)));

            if let Some(sub_class_id) = map.get("sub_class_id").and_then(RawValue::as_int) {
                out.insert(
                    "sub_class_id".to_string(),
                    RawValue::str(self.classes.resolve_subclass(class_id, sub_class_id)),
                );
            }
        }

        out
    }

    fn subclass_name(&self, map: &RawMap) -> String {
        let class_id = map.get("class_id").and_then(RawValue::as_int);
        let sub_class = map.get("sub_class_id");

        match (class_id, sub_class.and_then(RawValue::as_int)) {
            (Some(class_id), Some(sub_class_id)) => {
                self.classes.resolve_subclass(class_id, sub_class_id)
            }
            _ => sub_class.map(RawValue::stringify).unwrap_or_default(),
        }
    }
}

/// A one-element list holding a map is shown as the map itself, unless the
/// map has a "model" key: flattening would drop the model name from the tree
/// when a category contains a single device.
fn unwrap_single_entry(node: &RawValue) -> &RawValue {
    if let RawValue::List(items) = node {
        if let [only @ RawValue::Map(map)] = items.as_slice() {
            if !map.contains_key("model") {
                return only;
            }
        }
    }
    node
}

/// `[["snd-hda", "index=0"], ...]` becomes `["modprobe snd-hda index=0", ...]`.
fn modprobe_lines(value: &RawValue) -> Option<RawValue> {
    let RawValue::List(entries) = value else {
        return None;
    };

    let mut lines = Vec::with_capacity(entries.len());
    for entry in entries {
        let RawValue::List(args) = entry else {
            return None;
        };
        let args: Option<Vec<&str>> = args.iter().map(RawValue::as_str).collect();
        lines.push(RawValue::str(format!("modprobe {}", args?.join(" "))));
    }

    Some(RawValue::List(lines))
}

fn is_single_empty_string(value: &RawValue) -> bool {
    matches!(value, RawValue::List(items)
        if matches!(items.as_slice(), [RawValue::Scalar(Scalar::Str(s))] if s.is_empty()))
}

/// `1280x1024`, or the bare width without a height.
fn resolution(map: &RawMap) -> String {
    let width = map.get("width").map(RawValue::stringify).unwrap_or_default();
    match map.get("height") {
        Some(height) => format!("{}x{}", width, height.stringify()),
        None => width,
    }
}

/// `eth0 (/dev/eth0)`, or the bare device without a device file.
fn device_label(map: &RawMap) -> String {
    let device = map.get("device").map(RawValue::stringify).unwrap_or_default();
    match map.get("dev_name").and_then(RawValue::as_str) {
        Some(dev_name) if !dev_name.is_empty() => format!("{} ({})", device, dev_name),
        _ => device,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::is_sorted_by_label;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawValue {
        RawValue::from(value)
    }

    fn raw_map(value: serde_json::Value) -> RawMap {
        raw(value).as_map().cloned().unwrap()
    }

    #[test]
    fn test_empty_renders_nothing() {
        assert!(render(&RawValue::Empty).is_empty());
    }

    #[test]
    fn test_scalar_is_translated() {
        assert_eq!(render(&RawValue::str("cpu")), vec![TreeNode::leaf("CPU")]);
        assert_eq!(render(&RawValue::int(7)), vec![TreeNode::leaf("7")]);
    }

    #[test]
    fn test_list_keeps_order_and_skips_translation_of_items() {
        let nodes = render(&raw(json!(["usb", "cpu", "apple"])));
        let labels: Vec<_> = nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["usb", "cpu", "apple"]);
    }

    #[test]
    fn test_map_entries_sorted_with_yes_no() {
        let nodes = render(&raw(json!({"vendor": "Intel", "active": true, "irq": 16})));
        assert!(is_sorted_by_label(&nodes));
        let labels: Vec<_> = nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Active: Yes", "IRQ: 16", "Vendor: Intel"]);
    }

    #[test]
    fn test_single_map_list_is_unwrapped() {
        assert_eq!(render(&raw(json!([{"a": 1}]))), render(&raw(json!({"a": 1}))));
    }

    #[test]
    fn test_single_map_list_with_model_is_kept() {
        let nodes = render(&raw(json!([{"model": "X", "a": 1}])));
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].label, "X");
        assert_eq!(nodes[0].child_labels(), vec!["Model: X", "a: 1"]);
    }

    #[test]
    fn test_list_of_unlabeled_maps_uses_placeholder() {
        let nodes = render(&raw(json!([{"a": 1}, {"b": 2}])));
        assert_eq!(nodes[0].label, PLACEHOLDER);
        assert_eq!(nodes[0].children, vec![TreeNode::leaf("a: 1")]);
        assert_eq!(nodes[1].label, PLACEHOLDER);
    }

    #[test]
    fn test_nested_list_element_uses_placeholder() {
        let nodes = render(&raw(json!([["x", "y"], "z"])));
        assert_eq!(nodes[0].label, PLACEHOLDER);
        assert_eq!(nodes[0].child_labels(), vec!["x", "y"]);
        assert_eq!(nodes[1], TreeNode::leaf("z"));
    }

    #[test]
    fn test_null_list_element_becomes_empty_placeholder() {
        let nodes = render(&RawValue::List(vec![RawValue::Empty, RawValue::str("z")]));
        assert_eq!(nodes[0], TreeNode::leaf(PLACEHOLDER));
        assert_eq!(nodes[1], TreeNode::leaf("z"));
    }

    #[test]
    fn test_single_empty_string_list_is_bare_label() {
        let nodes = render(&raw(json!({"dvd": [""], "irq": 3})));
        assert_eq!(nodes[0], TreeNode::leaf("DVD"));
    }

    #[test]
    fn test_empty_map_value_is_a_leaf() {
        let nodes = render(&raw(json!({"resource": {}, "irq": 3})));
        assert_eq!(nodes[1], TreeNode::leaf("Resources: "));
    }

    #[test]
    fn test_modules_become_modprobe_lines() {
        let nodes = render(&raw(json!({
            "modules": [["snd-hda-intel", "index=0"], ["snd-pcm"]],
            "irq": 3,
        })));
        let modules = nodes.iter().find(|n| n.label == "modules").unwrap();
        assert_eq!(
            modules.child_labels(),
            vec!["modprobe snd-hda-intel index=0", "modprobe snd-pcm"]
        );
    }

    #[test]
    fn test_class_ids_translated() {
        let nodes = render(&raw(json!({"class_id": 3, "sub_class_id": 0, "irq": 1})));
        let labels: Vec<_> = nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Class (spec): Display controller", "Class: Display controller", "IRQ: 1"]
        );
    }

    #[test]
    fn test_representative_device_with_dev_name() {
        let renderer = TreeRenderer::builtin();
        let map = raw_map(json!({"device": "eth0", "dev_name": "/dev/eth0"}));
        assert_eq!(renderer.representative(&map), "eth0 (/dev/eth0)");

        let map = raw_map(json!({"device": "eth0", "dev_name": ""}));
        assert_eq!(renderer.representative(&map), "eth0");
    }

    #[test]
    fn test_representative_rules() {
        let renderer = TreeRenderer::builtin();
        assert_eq!(renderer.representative(&raw_map(json!({"start": 255, "length": 8}))), "0xff");
        assert_eq!(renderer.representative(&raw_map(json!({"modules": [["a"]]}))), "Modules");
        assert_eq!(
            renderer.representative(&raw_map(json!({"width": 1280, "height": 1024}))),
            "1280x1024"
        );
        assert_eq!(renderer.representative(&raw_map(json!({"width": 640}))), "640");
        assert_eq!(
            renderer.representative(&raw_map(json!({"class_id": 2, "sub_class_id": 0}))),
            "Network controller"
        );
        assert_eq!(renderer.representative(&raw_map(json!({"type": "cpu"}))), "CPU");
        assert_eq!(renderer.representative(&raw_map(json!({"foo": 1}))), "");
    }

    #[test]
    fn test_representative_priority() {
        let renderer = TreeRenderer::builtin();
        let map = raw_map(json!({"vendor": "Acme", "model": "Widget", "type": "x"}));
        assert_eq!(renderer.representative(&map), "Widget");
    }

    #[test]
    fn test_empty_compound_values_render_as_empty_leaves() {
        let mut map = RawMap::new();
        map.insert("resource".to_string(), RawValue::List(Vec::new()));
        map.insert("driver_info".to_string(), RawValue::Map(RawMap::new()));
        let nodes = render(&RawValue::Map(map));
        assert_eq!(
            nodes,
            vec![TreeNode::leaf("Resources: "), TreeNode::leaf("driver_info: ")]
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let value = raw(json!({"b": [1, 2], "a": {"x": true}}));
        assert_eq!(render(&value), render(&value));
    }
}
