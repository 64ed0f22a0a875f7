use tracing::debug;

use crate::domain::{
    common::{DateRange, Displayable},
    employee::Employee,
    variation::{Variation, VariationEdit},
};

use super::{ServiceError, ServiceResult};

/// Manages dated schedule overrides.
pub struct VariationService;

impl VariationService {
    /// Adds a blank variation over `range`. Returns its id.
    pub fn add(
        employee: &mut Employee,
        site: &str,
        range: DateRange,
        is_mids: bool,
    ) -> ServiceResult<u32> {
        Self::validate_range(range)?;
        let id = employee.next_variation_id();
        let mut variation = Variation::new(id, site, range.start, range.end);
        variation.is_mids = is_mids;
        debug!(employee = %employee.id, variation = %variation.display_label(), "variation added");
        employee.variations.push(variation);
        employee.sort_variations();
        employee.touch();
        Ok(id)
    }

    pub fn edit(employee: &mut Employee, id: u32, edit: VariationEdit) -> ServiceResult<()> {
        let variation = employee
            .variation_mut(id)
            .ok_or_else(|| ServiceError::NotFound(format!("Variation {id}")))?;
        match edit {
            VariationEdit::SetSite(site) => variation.site = site,
            VariationEdit::SetDates { start, end } => {
                Self::validate_range(DateRange::new(start, end))?;
                variation.start_date = start;
                variation.end_date = end;
            }
            VariationEdit::SetMids(is_mids) => variation.is_mids = is_mids,
            VariationEdit::ResizeSchedule(days) => {
                if days == 0 {
                    return Err(ServiceError::Validation(
                        "Schedule must keep at least one day".into(),
                    ));
                }
                variation.schedule.resize(days);
            }
            VariationEdit::SetWorkday {
                index,
                code,
                workcenter,
                hours,
            } => {
                if index >= variation.schedule.len() {
                    return Err(ServiceError::Validation(format!(
                        "Workday {index} is outside a {} day schedule",
                        variation.schedule.len()
                    )));
                }
                variation.schedule.set_workday(index, &code, &workcenter, hours);
            }
        }
        employee.sort_variations();
        employee.touch();
        Ok(())
    }

    pub fn remove(employee: &mut Employee, id: u32) -> ServiceResult<Variation> {
        let pos = employee
            .variations
            .iter()
            .position(|vari| vari.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("Variation {id}")))?;
        let removed = employee.variations.remove(pos);
        employee.touch();
        Ok(removed)
    }

    /// Schedule-modification variation created for a request over `range`.
    pub fn find_mod(employee: &Employee, range: DateRange) -> Option<&Variation> {
        employee.variations.iter().find(|vari| vari.matches_mod(range))
    }

    fn validate_range(range: DateRange) -> ServiceResult<()> {
        if range.start > range.end {
            Err(ServiceError::Validation(format!(
                "Variation start {} is after its end {}",
                range.start, range.end
            )))
        } else {
            Ok(())
        }
    }
}
