use minifb::{Key, Window, WindowOptions};
use std::time::Duration;

use crate::errors::{RidgeError, Result};
use crate::grid::Grid;
use crate::pipeline::EnhancedStages;

/// Interactive stage viewer for a single enhanced image.
///
/// Space or Right steps forward through the pipeline stages, Left steps
/// back, Escape closes the window.
pub fn run_viewer(stem: &str, stages: &EnhancedStages) -> Result<()> {
    let stage_list = stages.stages();
    let width = stages.normalized.width() as usize;
    let height = stages.normalized.height() as usize;

    // Create window
    let mut window = Window::new(
        "RidgePrint Viewer",
        width,
        height,
        WindowOptions {
            resize: false,
            scale: minifb::Scale::X1,
            ..WindowOptions::default()
        },
    )
    .map_err(|e| RidgeError::Other(format!("Failed to create window: {}", e)))?;

    window.limit_update_rate(Some(Duration::from_millis(50))); // 20 FPS

    println!("Viewer keys: Space/Right = next stage, Left = previous, Esc = close");

    let mut current = 0usize;
    let mut buffer = grid_to_buffer(stage_list[current].1);
    window.set_title(&stage_title(stem, stage_list[current].0));

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let mut selected = current;
        if window.is_key_pressed(Key::Space, minifb::KeyRepeat::No)
            || window.is_key_pressed(Key::Right, minifb::KeyRepeat::No)
        {
            selected = (current + 1) % stage_list.len();
        }
        if window.is_key_pressed(Key::Left, minifb::KeyRepeat::No) {
            selected = (current + stage_list.len() - 1) % stage_list.len();
        }

        if selected != current {
            current = selected;
            buffer = grid_to_buffer(stage_list[current].1);
            window.set_title(&stage_title(stem, stage_list[current].0));
        }

        // Update the window
        window
            .update_with_buffer(&buffer, width, height)
            .map_err(|e| RidgeError::Other(format!("Failed to update window: {}", e)))?;
    }

    Ok(())
}

fn stage_title(stem: &str, stage: &str) -> String {
    format!("RidgePrint - {} [{}]", stem, stage)
}

/// Expand grid samples into 0RGB framebuffer pixels, row by row.
fn grid_to_buffer(grid: &Grid) -> Vec<u32> {
    let bounds = grid.bounds();
    let mut buffer = Vec::with_capacity((grid.width() * grid.height()) as usize);
    for y in bounds.min_y..bounds.max_y {
        for x in bounds.min_x..bounds.max_x {
            let level = grid.at(x, y).clamp(0.0, 255.0) as u32;
            buffer.push((level << 16) | (level << 8) | level);
        }
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{BLACK, WHITE};

    #[test]
    fn samples_expand_to_gray_pixels() {
        let mut grid = Grid::new(2, 2);
        grid.set(0, 0, BLACK);
        grid.set(1, 0, WHITE);
        grid.set(0, 1, 128.0);
        grid.set(1, 1, 300.0);
        let buffer = grid_to_buffer(&grid);
        assert_eq!(buffer, vec![0x000000, 0xFFFFFF, 0x808080, 0xFFFFFF]);
    }
}
