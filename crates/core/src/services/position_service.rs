use crate::errors::CoreError;
use crate::models::position::PositionInput;

/// Manages the session's list of entered positions.
///
/// Pure business logic — no I/O, no API calls. Positions keep their entry
/// order; new ids are one more than the highest id in the list.
pub struct PositionService;

impl PositionService {
    pub fn new() -> Self {
        Self
    }

    /// Append a position, assigning it the next free id. Incomplete inputs
    /// are accepted: completeness is checked when a calculation starts.
    pub fn add_position(&self, positions: &mut Vec<PositionInput>, mut input: PositionInput) -> u64 {
        let id = positions.iter().map(|p| p.id).max().map_or(1, |max| max + 1);
        input.id = id;
        positions.push(input);
        id
    }

    /// Replace the position with `id`, keeping its id.
    pub fn update_position(
        &self,
        positions: &mut [PositionInput],
        id: u64,
        mut input: PositionInput,
    ) -> Result<(), CoreError> {
        let slot = positions
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(CoreError::PositionNotFound(id))?;
        input.id = id;
        *slot = input;
        Ok(())
    }

    /// Remove the position with `id` and return it.
    pub fn remove_position(
        &self,
        positions: &mut Vec<PositionInput>,
        id: u64,
    ) -> Result<PositionInput, CoreError> {
        let idx = positions
            .iter()
            .position(|p| p.id == id)
            .ok_or(CoreError::PositionNotFound(id))?;
        Ok(positions.remove(idx))
    }
}

impl Default for PositionService {
    fn default() -> Self {
        Self::new()
    }
}
