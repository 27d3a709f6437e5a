//! Virtual machine and VM pool commands.
//!
//! Note `vm.action`: the daemon takes the action name before the id.

use super::HttpMethod::{Get, Post, Put};
use super::ParamDefault::{Bool, Int, Str};
use super::{body, path, query, CommandDef};

pub const COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: "vm.allocate",
        method: Post,
        params: &[body("template", Str("")), body("status", Bool(false))],
    },
    CommandDef {
        name: "vm.deploy",
        method: Put,
        params: &[
            path("id", Int(-1)),
            body("host", Int(-1)),
            body("enforce", Bool(false)),
            body("datastore", Int(-1)),
            body("nic", Str("")),
        ],
    },
    CommandDef {
        name: "vm.action",
        method: Put,
        params: &[body("action", Str("")), path("id", Int(-1))],
    },
    CommandDef {
        name: "vm.migrate",
        method: Put,
        params: &[
            path("id", Int(-1)),
            body("host", Int(-1)),
            body("live", Bool(false)),
            body("enforce", Bool(false)),
            body("datastore", Int(-1)),
            body("type", Int(0)),
        ],
    },
    CommandDef {
        name: "vm.chown",
        method: Put,
        params: &[path("id", Int(-1)), body("user", Int(-1)), body("group", Int(-1))],
    },
    CommandDef {
        name: "vm.rename",
        method: Put,
        params: &[path("id", Int(-1)), body("name", Str(""))],
    },
    CommandDef {
        name: "vm.update",
        method: Put,
        params: &[
            path("id", Int(-1)),
            body("template", Str("")),
            body("replace", Int(0)),
        ],
    },
    CommandDef {
        name: "vm.resize",
        method: Put,
        params: &[
            path("id", Int(-1)),
            body("template", Str("")),
            body("enforce", Bool(false)),
        ],
    },
    CommandDef {
        name: "vm.snapshotcreate",
        method: Post,
        params: &[path("id", Int(-1)), body("name", Str(""))],
    },
    CommandDef {
        name: "vm.snapshotrevert",
        method: Post,
        params: &[path("id", Int(-1)), body("snapshot", Int(-1))],
    },
    CommandDef {
        name: "vm.snapshotdelete",
        method: Post,
        params: &[path("id", Int(-1)), body("snapshot", Int(-1))],
    },
    CommandDef {
        name: "vm.lock",
        method: Put,
        params: &[path("id", Int(-1)), body("level", Int(4)), body("test", Bool(false))],
    },
    CommandDef {
        name: "vm.unlock",
        method: Put,
        params: &[path("id", Int(-1))],
    },
    CommandDef {
        name: "vm.info",
        method: Get,
        params: &[path("id", Int(-1)), query("decrypt", Bool(false))],
    },
    CommandDef {
        name: "vm.monitoring",
        method: Get,
        params: &[path("id", Int(-1))],
    },
    CommandDef {
        name: "vmpool.info",
        method: Get,
        params: &[
            query("filter", Int(-1)),
            query("start", Int(-1)),
            query("end", Int(-1)),
            query("state", Int(-2)),
            query("filterbykey", Str("")),
        ],
    },
    CommandDef {
        name: "vmpool.infoextended",
        method: Get,
        params: &[
            query("filter", Int(-1)),
            query("start", Int(-1)),
            query("end", Int(-1)),
            query("state", Int(-2)),
            query("filterbykey", Str("")),
        ],
    },
    CommandDef {
        name: "vmpool.monitoring",
        method: Get,
        params: &[query("filter", Int(-2)), query("seconds", Int(-1))],
    },
    CommandDef {
        name: "vmpool.accounting",
        method: Get,
        params: &[
            query("filter", Int(-2)),
            query("start_time", Int(-1)),
            query("end_time", Int(-1)),
        ],
    },
    CommandDef {
        name: "vmpool.showback",
        method: Get,
        params: &[
            query("filter", Int(-2)),
            query("first_month", Int(-1)),
            query("first_year", Int(-1)),
            query("last_month", Int(-1)),
            query("last_year", Int(-1)),
        ],
    },
];
