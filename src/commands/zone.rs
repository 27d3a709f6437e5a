use super::HttpMethod::Get;
use super::ParamDefault::{Bool, Int};
use super::{path, query, CommandDef};

pub const COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: "zone.info",
        method: Get,
        params: &[path("id", Int(-1)), query("decrypt", Bool(false))],
    },
    CommandDef {
        name: "zone.raftstatus",
        method: Get,
        params: &[],
    },
    CommandDef {
        name: "zonepool.info",
        method: Get,
        params: &[],
    },
];
