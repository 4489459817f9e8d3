//! Field Sets - Typed Conditions and Themes
//!
//! Each recognized fragment key maps to exactly one output directive. The
//! vocabulary is fixed; keys outside it are ignored on read. A value of the
//! wrong shape is an error naming its key.

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::value::{format_entry, key_error, Directives, FieldValue};

/// A field set that can be stacked on top of another.
pub trait Layered: Default + Clone {
    /// Overwrite every field of `self` that `upper` sets.
    fn layer(&mut self, upper: &Self);

    /// Copy of `self` with `upper` stacked on top.
    fn layered(&self, upper: &Self) -> Self {
        let mut merged = self.clone();
        merged.layer(upper);
        merged
    }
}

/// One recognized field with its directive mapping.
#[derive(Debug, Clone, Copy)]
pub struct FieldEntry<'a> {
    pub key: &'static str,
    pub directive: &'static str,
    pub escaped: bool,
    pub value: Option<&'a FieldValue>,
}

macro_rules! directive_fields {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $field:ident = $key:literal => $directive:literal, escaped = $escaped:literal; )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize)]
        pub struct $name {
            $(
                #[serde(rename = $key, skip_serializing_if = "Option::is_none")]
                pub $field: Option<FieldValue>,
            )*
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                struct FieldsVisitor;

                impl<'de> Visitor<'de> for FieldsVisitor {
                    type Value = $name;

                    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        f.write_str("a map of fields")
                    }

                    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<$name, A::Error> {
                        let mut fields = $name::default();
                        while let Some(key) = map.next_key::<String>()? {
                            match key.as_str() {
                                $(
                                    $key => {
                                        fields.$field = map
                                            .next_value::<Option<FieldValue>>()
                                            .map_err(|e| key_error($key, e))?;
                                    }
                                )*
                                _ => {
                                    map.next_value::<de::IgnoredAny>()?;
                                }
                            }
                        }
                        Ok(fields)
                    }
                }

                deserializer.deserialize_map(FieldsVisitor)
            }
        }

        impl $name {
            /// Every recognized field in output order.
            pub fn entries(&self) -> Vec<FieldEntry<'_>> {
                vec![
                    $(
                        FieldEntry {
                            key: $key,
                            directive: $directive,
                            escaped: $escaped,
                            value: self.$field.as_ref(),
                        },
                    )*
                ]
            }

            pub fn is_empty(&self) -> bool {
                true $( && self.$field.is_none() )*
            }
        }

        impl Layered for $name {
            fn layer(&mut self, upper: &Self) {
                $(
                    if let Some(value) = &upper.$field {
                        self.$field = Some(value.clone());
                    }
                )*
            }
        }
    };
}

directive_fields! {
    /// Item matching fields, rendered in the rule's conditions block.
    pub struct ConditionFields {
        item_level = "itemLevel" => "ItemLevel", escaped = false;
        drop_level = "dropLevel" => "DropLevel", escaped = false;
        quality = "quality" => "Quality", escaped = false;
        rarity = "rarity" => "Rarity", escaped = false;
        class = "class" => "Class", escaped = true;
        base_type = "type" => "BaseType", escaped = true;
        prophecy = "prophecy" => "Prophecy", escaped = true;
        sockets = "sockets" => "Sockets", escaped = false;
        links = "links" => "LinkedSockets", escaped = false;
        socket_colors = "socketColors" => "SocketGroup", escaped = false;
        height = "height" => "Height", escaped = false;
        width = "width" => "Width", escaped = false;
        explicit_mod = "mod" => "HasExplicitMod", escaped = true;
        enchanted = "enchanted" => "AnyEnchantment", escaped = false;
        enchantment = "enchantment" => "HasEnchantment", escaped = true;
        stack_size = "stackSize" => "StackSize", escaped = false;
        gem_level = "gemLevel" => "GemLevel", escaped = false;
        identified = "identified" => "Identified", escaped = false;
        corrupted = "corrupted" => "Corrupted", escaped = false;
        elder = "elder" => "ElderItem", escaped = false;
        shaper = "shaper" => "ShaperItem", escaped = false;
        fractured = "fractured" => "FracturedItem", escaped = false;
        synthesised = "synthesised" => "SynthesisedItem", escaped = false;
        shaped = "shaped" => "ShapedMap", escaped = false;
        tier = "tier" => "MapTier", escaped = false;
    }
}

directive_fields! {
    /// Visual fields. Values are style identifiers, not literals.
    pub struct ThemeFields {
        border = "border" => "SetBorderColor", escaped = false;
        text = "text" => "SetTextColor", escaped = false;
        background = "background" => "SetBackgroundColor", escaped = false;
        size = "size" => "SetFontSize", escaped = false;
        sound = "sound" => "PlayAlertSoundPositional", escaped = false;
        drop_sound = "dropSound" => "DisableDropSound", escaped = false;
        icon = "icon" => "MinimapIcon", escaped = false;
        beam = "beam" => "PlayEffect", escaped = false;
    }
}

impl ConditionFields {
    /// Format every present field into its directive.
    pub fn directives(&self) -> Directives {
        let mut directives = Directives::new();
        for entry in self.entries() {
            format_entry(&mut directives, entry.directive, entry.value, entry.escaped);
        }
        directives
    }
}
