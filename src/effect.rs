use crate::persist::RunSnapshot;

#[derive(Debug, Clone)]
pub enum Effect {
    SaveRun {
        path: String,
        snapshot: Box<RunSnapshot>,
    },
    LoadRun {
        path: String,
    },
}
