use serde::{Deserialize, Serialize};

use crate::model::{NodeKind, NodeStyle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub fill: String,
    pub stroke: String,
    pub text_color: String,
    pub line_color: String,
    pub terminal_fill: String,
    pub decision_fill: String,
    pub note_fill: String,
    pub anchor_color: String,
    pub guideline_color: String,
    pub corner_radius: f32,
    pub arrow_size: f32,
}

impl Theme {
    pub fn audit_default() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 14.0,
            fill: "#ECECFF".to_string(),
            stroke: "#9370DB".to_string(),
            text_color: "#333333".to_string(),
            line_color: "#333333".to_string(),
            terminal_fill: "#D5E8D4".to_string(),
            decision_fill: "#FFF2CC".to_string(),
            note_fill: "#FFFFDE".to_string(),
            anchor_color: "#4A90D9".to_string(),
            guideline_color: "#FF4081".to_string(),
            corner_radius: 8.0,
            arrow_size: 10.0,
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            fill: "#F8FAFF".to_string(),
            stroke: "#C7D2E5".to_string(),
            text_color: "#1C2430".to_string(),
            line_color: "#7A8AA6".to_string(),
            terminal_fill: "#E4F2E7".to_string(),
            decision_fill: "#FBF3DB".to_string(),
            note_fill: "#FFFBEB".to_string(),
            anchor_color: "#3B82F6".to_string(),
            guideline_color: "#EC4899".to_string(),
            corner_radius: 10.0,
            arrow_size: 9.0,
        }
    }

    fn fill_for(&self, kind: NodeKind) -> &str {
        match kind {
            NodeKind::Start | NodeKind::End => &self.terminal_fill,
            NodeKind::Decision => &self.decision_fill,
            NodeKind::Note => &self.note_fill,
            _ => &self.fill,
        }
    }

    /// Resolves the effective style for a node: theme defaults for its kind,
    /// overridden field-by-field by the node's own style.
    pub fn resolve_style(&self, kind: NodeKind, overrides: Option<&NodeStyle>) -> NodeStyle {
        let mut style = NodeStyle {
            fill: Some(self.fill_for(kind).to_string()),
            stroke: Some(self.stroke.clone()),
            text_color: Some(self.text_color.clone()),
        };
        if let Some(overrides) = overrides {
            if let Some(fill) = &overrides.fill {
                style.fill = Some(fill.clone());
            }
            if let Some(stroke) = &overrides.stroke {
                style.stroke = Some(stroke.clone());
            }
            if let Some(text_color) = &overrides.text_color {
                style.text_color = Some(text_color.clone());
            }
        }
        style
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::audit_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_override_beats_kind_default() {
        let theme = Theme::audit_default();
        let overrides = NodeStyle {
            fill: Some("#112233".to_string()),
            ..NodeStyle::default()
        };
        let resolved = theme.resolve_style(NodeKind::Decision, Some(&overrides));
        assert_eq!(resolved.fill.as_deref(), Some("#112233"));
        assert_eq!(resolved.stroke.as_deref(), Some("#9370DB"));
    }
}
