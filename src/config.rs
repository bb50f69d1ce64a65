use std::fs;
use std::path::Path;

use crate::error::PlanError;

/// All tunables of one planning run, loaded once and passed around immutably.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    pub image_path: String,
    pub robot_width: u32,
    pub robot_height: u32,
    pub open_kernel_width: u32,
    pub open_kernel_height: u32,
    pub dilate_kernel_width: u32,
    pub dilate_kernel_height: u32,
    pub sweep_step: i32,
    pub show_cells: bool,
    pub mouse_select_start: bool,
    pub start_x: u32,
    pub start_y: u32,
    pub subdivision_dist: u32,
    pub manual_orientation: bool,
    pub crop_region: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            image_path: String::new(),
            robot_width: 1,
            robot_height: 1,
            open_kernel_width: 1,
            open_kernel_height: 1,
            dilate_kernel_width: 1,
            dilate_kernel_height: 1,
            sweep_step: 5,
            show_cells: false,
            mouse_select_start: false,
            start_x: 0,
            start_y: 0,
            subdivision_dist: 0,
            manual_orientation: false,
            crop_region: false,
        }
    }
}

/// Parses the whitespace-separated key-then-values format:
/// one key per line followed by its values. Unknown keys are skipped;
/// absent keys keep their defaults.
pub fn parse(text: &str) -> Result<Params, PlanError> {
    let mut params = Params::default();
    let mut tokens = text.split_whitespace();

    fn next_num<T: std::str::FromStr>(
        tokens: &mut std::str::SplitWhitespace<'_>,
        key: &str,
    ) -> Result<T, PlanError> {
        let tok = tokens
            .next()
            .ok_or_else(|| PlanError::InvalidParameter(format!("{key}: missing value")))?;
        tok.parse()
            .map_err(|_| PlanError::InvalidParameter(format!("{key}: bad value {tok:?}")))
    }

    fn next_flag(
        tokens: &mut std::str::SplitWhitespace<'_>,
        key: &str,
    ) -> Result<bool, PlanError> {
        Ok(next_num::<u32>(tokens, key)? != 0)
    }

    while let Some(key) = tokens.next() {
        match key {
            "IMAGE_PATH" => {
                params.image_path = tokens
                    .next()
                    .ok_or_else(|| {
                        PlanError::InvalidParameter("IMAGE_PATH: missing value".into())
                    })?
                    .to_string();
            }
            "ROBOT_SIZE" => {
                params.robot_width = next_num(&mut tokens, key)?;
                params.robot_height = next_num(&mut tokens, key)?;
            }
            "MORPH_SIZE" => {
                params.open_kernel_width = next_num(&mut tokens, key)?;
                params.open_kernel_height = next_num(&mut tokens, key)?;
            }
            "OBSTACLE_INFLATION" => {
                params.dilate_kernel_width = next_num(&mut tokens, key)?;
                params.dilate_kernel_height = next_num(&mut tokens, key)?;
            }
            "SWEEP_STEP" => params.sweep_step = next_num(&mut tokens, key)?,
            "SHOW_CELLS" => params.show_cells = next_flag(&mut tokens, key)?,
            "MOUSE_SELECT_START" => params.mouse_select_start = next_flag(&mut tokens, key)?,
            "START_POS" => {
                params.start_x = next_num(&mut tokens, key)?;
                params.start_y = next_num(&mut tokens, key)?;
            }
            "SUBDIVISION_DIST" => params.subdivision_dist = next_num(&mut tokens, key)?,
            "MANUAL_ORIENTATION" => params.manual_orientation = next_flag(&mut tokens, key)?,
            "CROP_REGION" => params.crop_region = next_flag(&mut tokens, key)?,
            _ => {} // unknown keys are ignored
        }
    }

    if params.sweep_step <= 0 {
        return Err(PlanError::InvalidParameter(format!(
            "SWEEP_STEP must be positive, got {}",
            params.sweep_step
        )));
    }

    Ok(params)
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<Params, PlanError> {
    let text = fs::read_to_string(path)?;
    parse(&text)
}
