use super::url::{PropertyUrlInfo, UrlError, WizardMode, WizardPaths};
use crate::flows::steps::{self, StepDefinition, StepSection};
use crate::flows::{FlowContext, FlowServiceFactory, FlowType, FormState};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Active wizard modes. Re-derived from the form and URL on every call and
/// resolved in classifier priority order, so at most one specialized mode is
/// set. `is_sale_mode` follows the resolved flow's listing type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeFlags {
    #[serde(rename = "isPGHostelMode")]
    pub is_pg_hostel_mode: bool,
    pub is_coworking_mode: bool,
    pub is_land_mode: bool,
    pub is_flatmates_mode: bool,
    pub is_commercial_sale_mode: bool,
    pub is_commercial_rent_mode: bool,
    pub is_sale_mode: bool,
}

impl ModeFlags {
    pub fn derive(form: &FormState, context: &FlowContext) -> Self {
        let flow = FlowServiceFactory::get_flow_service(form, context)
            .map(|service| service.flow_type())
            .unwrap_or(FlowType::ResidentialRent);
        Self::for_flow(flow)
    }

    pub fn for_flow(flow: FlowType) -> Self {
        Self {
            is_pg_hostel_mode: flow == FlowType::ResidentialPgHostel,
            is_coworking_mode: flow == FlowType::CommercialCoworking,
            is_land_mode: flow == FlowType::LandSale,
            is_flatmates_mode: flow == FlowType::ResidentialFlatmates,
            is_commercial_sale_mode: flow == FlowType::CommercialSale,
            is_commercial_rent_mode: flow == FlowType::CommercialRent,
            is_sale_mode: matches!(
                flow,
                FlowType::ResidentialSale | FlowType::CommercialSale | FlowType::LandSale
            ),
        }
    }

    /// Flow whose sequence the wizard shows. Residential rent when no mode is set.
    pub fn active_flow(&self) -> FlowType {
        if self.is_pg_hostel_mode {
            FlowType::ResidentialPgHostel
        } else if self.is_coworking_mode {
            FlowType::CommercialCoworking
        } else if self.is_land_mode {
            FlowType::LandSale
        } else if self.is_flatmates_mode {
            FlowType::ResidentialFlatmates
        } else if self.is_commercial_sale_mode {
            FlowType::CommercialSale
        } else if self.is_commercial_rent_mode {
            FlowType::CommercialRent
        } else if self.is_sale_mode {
            FlowType::ResidentialSale
        } else {
            FlowType::ResidentialRent
        }
    }

    /// Whether a page of this kind is hidden under the current modes.
    pub fn hides(&self, section: StepSection) -> bool {
        match section {
            StepSection::Rental => {
                self.is_sale_mode
                    || self.is_pg_hostel_mode
                    || self.is_coworking_mode
                    || self.is_land_mode
                    || self.is_flatmates_mode
            }
            StepSection::Sale => !self.is_sale_mode,
            StepSection::BasicDetails => self.is_pg_hostel_mode || self.is_land_mode,
            StepSection::RoomDetails | StepSection::PgDetails => !self.is_pg_hostel_mode,
            StepSection::Flatmate => !self.is_flatmates_mode,
            StepSection::Coworking => !self.is_coworking_mode,
            StepSection::LandDetails | StepSection::LandFeatures => !self.is_land_mode,
            StepSection::Features => self.is_land_mode,
            StepSection::Location | StepSection::Review | StepSection::Photos => false,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("step {0} is outside the active sequence")]
    StepOutOfRange(usize),
    #[error("step '{0}' is not part of the navigable sequence")]
    NotNavigable(&'static str),
    #[error("no step {direction} '{from}'")]
    NoNeighbour {
        direction: Direction,
        from: &'static str,
    },
    #[error(transparent)]
    Url(#[from] UrlError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Next => f.write_str("after"),
            Direction::Previous => f.write_str("before"),
        }
    }
}

/// Serializable view of the wizard at one moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSnapshot {
    pub flow_type: FlowType,
    pub flags: ModeFlags,
    pub url_path: String,
    pub form_step: usize,
    pub current_step: Option<StepDefinition>,
    pub steps: Vec<StepDefinition>,
    pub visible_steps: Vec<StepDefinition>,
    pub hidden_steps: Vec<StepDefinition>,
}

/// One owner's pass through the listing wizard.
///
/// `form_step` is 1-based over the active flow's full sequence. Pages that
/// sibling flows of the same category own (the rental page while in sale
/// mode, say) are hidden by the current modes but can still be opened by id
/// or slug; while one is open `form_step` rests on the page before it.
/// The flow is never cached: editing the form can switch the sequence
/// mid-session.
#[derive(Debug, Clone)]
pub struct WizardSession {
    form: FormState,
    context: FlowContext,
    form_step: usize,
    hidden_page: Option<&'static StepDefinition>,
    paths: WizardPaths,
}

impl WizardSession {
    /// Starts at the step named in the URL, or at the first step.
    pub fn new(form: FormState, context: FlowContext, paths: WizardPaths) -> Self {
        let mut session = Self {
            form,
            context,
            form_step: 1,
            hidden_page: None,
            paths,
        };
        let info = session.url_info();
        if let Some(step) = info.step.as_deref() {
            session.enter(step, false);
        }
        session
    }

    /// Resumes at an explicit step id or slug, ignoring the URL.
    pub fn resume(
        form: FormState,
        context: FlowContext,
        paths: WizardPaths,
        step: &str,
    ) -> Self {
        let mut session = Self::new(form, context, paths);
        session.go_to_step(step);
        session
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn url_path(&self) -> &str {
        &self.context.url_path
    }

    pub fn form_step(&self) -> usize {
        self.form_step
    }

    pub fn flags(&self) -> ModeFlags {
        ModeFlags::derive(&self.form, &self.context)
    }

    pub fn active_flow(&self) -> FlowType {
        self.flags().active_flow()
    }

    /// Full sequence of the active flow, review included.
    pub fn steps(&self) -> &'static [StepDefinition] {
        steps::sequence(self.active_flow())
    }

    /// Pages reachable with next / previous: the wizard's step table with
    /// review and every page the modes hide removed.
    pub fn visible_steps(&self) -> Vec<&'static StepDefinition> {
        let flags = self.flags();
        step_table(flags)
            .into_iter()
            .filter(|definition| definition.section != StepSection::Review)
            .filter(|definition| !flags.hides(definition.section))
            .collect()
    }

    /// Pages the current modes hide. They stay reachable through `go_to_step`.
    pub fn hidden_steps(&self) -> Vec<&'static StepDefinition> {
        let flags = self.flags();
        step_table(flags)
            .into_iter()
            .filter(|definition| flags.hides(definition.section))
            .collect()
    }

    pub fn current_step(&self) -> Option<&'static StepDefinition> {
        self.hidden_page.or_else(|| {
            self.form_step
                .checked_sub(1)
                .and_then(|index| self.steps().get(index))
        })
    }

    pub fn next_step(&mut self) {
        self.navigate(Direction::Next);
    }

    pub fn previous_step(&mut self) {
        self.navigate(Direction::Previous);
    }

    /// Jumps to any page of the wizard's step table, hidden ones included.
    /// Returns false when no page has that id or slug.
    pub fn go_to_step(&mut self, id_or_slug: &str) -> bool {
        self.enter(id_or_slug, true)
    }

    /// Enters the review page. The URL keeps pointing at the last data page.
    pub fn open_review(&mut self) -> bool {
        let flow = self.active_flow();
        match steps::step_for_section(flow, StepSection::Review) {
            Some(review) => {
                if let Some(index) = steps::position(flow, review.id) {
                    self.form_step = index + 1;
                    self.hidden_page = None;
                }
                true
            }
            None => false,
        }
    }

    /// Merges edited values into the root of the form. The active flow may change.
    pub fn update_form(&mut self, updates: serde_json::Map<String, Value>) {
        let before = self.active_flow();
        for (key, value) in updates {
            self.form.insert(key, value);
        }
        let after = self.active_flow();
        if before != after {
            debug!(from = %before, to = %after, "active flow changed after form update");
            if let Some(page) = self.hidden_page.take() {
                if let Some(index) = steps::position(after, page.slug) {
                    self.form_step = index + 1;
                }
            }
            self.form_step = self.form_step.clamp(1, self.steps().len().max(1));
        }
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        let flags = self.flags();
        NavigationSnapshot {
            flow_type: flags.active_flow(),
            flags,
            url_path: self.context.url_path.clone(),
            form_step: self.form_step,
            current_step: self.current_step().copied(),
            steps: self.steps().to_vec(),
            visible_steps: self.visible_steps().into_iter().copied().collect(),
            hidden_steps: self.hidden_steps().into_iter().copied().collect(),
        }
    }

    /// Pages of the active flow move `form_step` (and the URL when `sync_url`
    /// is set, review excepted). Hidden pages keep the URL: their slug under
    /// the active flow's path would classify as the sibling flow.
    fn enter(&mut self, id_or_slug: &str, sync_url: bool) -> bool {
        let flags = self.flags();
        let flow = flags.active_flow();

        if let Some(index) = steps::position(flow, id_or_slug) {
            let definition = &steps::sequence(flow)[index];
            if sync_url && definition.section != StepSection::Review {
                match self.step_url(flow, definition.slug) {
                    Ok(url) => self.context.url_path = url,
                    Err(err) => warn!(error = %err, "wizard url left unchanged"),
                }
            }
            self.form_step = index + 1;
            self.hidden_page = None;
            return true;
        }

        let hidden = step_table(flags).into_iter().find(|definition| {
            flags.hides(definition.section)
                && (definition.id == id_or_slug || definition.slug == id_or_slug)
        });
        let Some(page) = hidden else {
            warn!(flow = %flow, step = id_or_slug, "requested step is not part of the active flow");
            return false;
        };

        debug!(flow = %flow, step = page.id, "entering hidden step");
        let total = steps::sequence(flow).len().max(1);
        self.form_step = steps::slot(page).unwrap_or(1).clamp(1, total);
        self.hidden_page = Some(page);
        true
    }

    fn navigate(&mut self, direction: Direction) {
        if let Err(err) = self.try_navigate(direction) {
            let total = self.steps().len().max(1);
            let fallback = match direction {
                Direction::Next => (self.form_step + 1).min(total),
                Direction::Previous => self.form_step.saturating_sub(1).max(1),
            };
            warn!(error = %err, from = self.form_step, to = fallback, "step navigation fell back");
            self.form_step = fallback;
            self.hidden_page = None;
        }
    }

    /// URL first, then the step index, so a failed move leaves the last good URL.
    fn try_navigate(&mut self, direction: Direction) -> Result<(), NavigationError> {
        let flow = self.active_flow();
        let current = self
            .current_step()
            .ok_or(NavigationError::StepOutOfRange(self.form_step))?;
        let visible = self.visible_steps();

        let neighbour = match visible.iter().position(|definition| definition.id == current.id) {
            Some(position) => match direction {
                Direction::Next => visible.get(position + 1),
                Direction::Previous => position.checked_sub(1).and_then(|index| visible.get(index)),
            },
            None if self.hidden_page.is_some() => {
                let slot = steps::slot(current).ok_or(NavigationError::NotNavigable(current.id))?;
                match direction {
                    Direction::Next => visible
                        .iter()
                        .find(|definition| steps::slot(definition).is_some_and(|other| other > slot)),
                    Direction::Previous => visible
                        .iter()
                        .rev()
                        .find(|definition| steps::slot(definition).is_some_and(|other| other < slot)),
                }
            }
            None => return Err(NavigationError::NotNavigable(current.id)),
        };
        let target = neighbour.copied().ok_or(NavigationError::NoNeighbour {
            direction,
            from: current.id,
        })?;
        let index = steps::position(flow, target.id).ok_or(NavigationError::NotNavigable(target.id))?;

        self.context.url_path = self.step_url(flow, target.slug)?;
        self.form_step = index + 1;
        self.hidden_page = None;
        Ok(())
    }

    fn url_info(&self) -> PropertyUrlInfo {
        self.paths.property_info_from_url(&self.context.url_path)
    }

    /// Edit sessions keep their property id; everything else gets the create
    /// URL of the active flow.
    fn step_url(&self, flow: FlowType, slug: &str) -> Result<String, UrlError> {
        let mut info = self.url_info();
        if info.mode != WizardMode::Edit {
            info.mode = WizardMode::Create;
            info.category = Some(flow.category());
            info.listing_type = Some(flow.listing_type());
        }
        self.paths.url_for_step(&info, slug)
    }
}

/// The active flow's sequence followed by the data pages that sibling flows of
/// the same category add and the active flow lacks. Each section appears once.
fn step_table(flags: ModeFlags) -> Vec<&'static StepDefinition> {
    let flow = flags.active_flow();
    let mut table: Vec<&'static StepDefinition> = steps::sequence(flow).iter().collect();
    let siblings = FlowType::ordered()
        .into_iter()
        .filter(|other| *other != flow && other.category() == flow.category());
    for sibling in siblings {
        for definition in steps::data_steps(sibling) {
            if !table.iter().any(|known| known.section == definition.section) {
                table.push(definition);
            }
        }
    }
    table
}
