use super::CommandDef;
use super::HttpMethod::Get;

pub const COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: "system.version",
        method: Get,
        params: &[],
    },
    CommandDef {
        name: "system.config",
        method: Get,
        params: &[],
    },
];
