//! Block ordering applied to every model response

use crate::types::ContentBlock;

/// Put prose ahead of the action it explains.
///
/// Only a response of exactly `[tool_use, text]` is swapped. Every other shape
/// keeps the order the model produced.
pub fn order_blocks(mut blocks: Vec<ContentBlock>) -> Vec<ContentBlock> {
    if blocks.len() == 2 && blocks[0].is_tool_use() && blocks[1].is_text() {
        blocks.swap(0, 1);
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool(name: &str) -> ContentBlock {
        ContentBlock::tool_use(format!("id_{}", name), name, json!({}))
    }

    fn text(t: &str) -> ContentBlock {
        ContentBlock::text(t)
    }

    #[test]
    fn test_tool_then_text_is_swapped() {
        assert_eq!(order_blocks(vec![tool("set"), text("Setting")]), vec![text("Setting"), tool("set")]);
    }

    #[test]
    fn test_other_shapes_are_preserved() {
        let shapes = vec![
            vec![],
            vec![tool("set")],
            vec![text("a")],
            vec![text("a"), tool("set")],
            vec![text("a"), text("b")],
            vec![tool("get"), tool("set")],
            vec![tool("set"), ContentBlock::Unknown],
            vec![tool("set"), text("a"), text("b")],
            vec![tool("get"), text("a"), tool("set")],
        ];
        for shape in shapes {
            assert_eq!(order_blocks(shape.clone()), shape);
        }
    }
}
