//! Placement of the wrapped text block.

/// One line of text at its absolute draw position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLine {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
}

/// The positioned text block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub lines: Vec<PlacedLine>,
}

/// Lay out `lines` on an image of `image_width` x `image_height`.
///
/// The block is as wide as its widest line and horizontally centered; its
/// top edge sits at `vertical_ratio * image_height`. Lines are `line_height
/// + spacing` apart and each is centered within the block. `measure`
/// returns the rendered pixel width of a line.
pub fn layout_block<F>(
    lines: &[String],
    image_width: u32,
    image_height: u32,
    line_height: u32,
    spacing: u32,
    vertical_ratio: f32,
    measure: F,
) -> TextBlock
where
    F: Fn(&str) -> u32,
{
    let widths: Vec<u32> = lines.iter().map(|l| measure(l)).collect();
    let width = widths.iter().copied().max().unwrap_or(0);
    let count = lines.len() as u32;
    let height = if count == 0 {
        0
    } else {
        count * line_height + (count - 1) * spacing
    };

    let x = ((image_width as f64 - width as f64) / 2.0).round() as i32;
    let y = (vertical_ratio as f64 * image_height as f64).round() as i32;
    let pitch = (line_height + spacing) as i32;

    let placed = lines
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (text, w))| PlacedLine {
            text: text.clone(),
            x: x + ((width - w) as f64 / 2.0).round() as i32,
            y: y + i as i32 * pitch,
            width: w,
        })
        .collect();

    TextBlock {
        x,
        y,
        width,
        height,
        lines: placed,
    }
}
