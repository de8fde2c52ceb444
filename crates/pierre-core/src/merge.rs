// ABOUTME: Schema-agnostic recursive JSON merge used to overlay partial stat trees
// ABOUTME: Overlay leaves win where defined; nulls and absent keys keep the base value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde_json::Value;

/// Merge `overlay` into `target` in place
///
/// Objects merge key by key, arrays merge index by index, any other overlay
/// value replaces the target value. `null` in the overlay never overwrites.
pub fn deep_merge(target: &mut Value, overlay: &Value) {
    match (target, overlay) {
        (_, Value::Null) => {}
        (Value::Object(target_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match target_map.get_mut(key) {
                    Some(existing) => deep_merge(existing, overlay_value),
                    None => {
                        if !overlay_value.is_null() {
                            target_map.insert(key.clone(), overlay_value.clone());
                        }
                    }
                }
            }
        }
        (Value::Array(target_items), Value::Array(overlay_items)) => {
            for (index, overlay_item) in overlay_items.iter().enumerate() {
                if let Some(existing) = target_items.get_mut(index) {
                    deep_merge(existing, overlay_item);
                } else if !overlay_item.is_null() {
                    target_items.push(overlay_item.clone());
                }
            }
        }
        (target_value, overlay_value) => *target_value = overlay_value.clone(),
    }
}
