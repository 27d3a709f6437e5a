//! Host and host pool commands.

use super::HttpMethod::{Delete, Get, Post, Put};
use super::ParamDefault::{Bool, Int, Str};
use super::{body, path, query, CommandDef};

pub const COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: "host.allocate",
        method: Post,
        params: &[
            body("hostname", Str("")),
            body("immad", Str("kvm")),
            body("vmmad", Str("kvm")),
            body("cluster", Int(-1)),
        ],
    },
    CommandDef {
        name: "host.delete",
        method: Delete,
        params: &[path("id", Int(-1))],
    },
    CommandDef {
        name: "host.status",
        method: Put,
        params: &[path("id", Int(-1)), body("status", Int(0))],
    },
    CommandDef {
        name: "host.update",
        method: Put,
        params: &[
            path("id", Int(-1)),
            body("template", Str("")),
            body("replace", Int(0)),
        ],
    },
    CommandDef {
        name: "host.rename",
        method: Put,
        params: &[path("id", Int(-1)), body("name", Str(""))],
    },
    CommandDef {
        name: "host.info",
        method: Get,
        params: &[path("id", Int(-1)), query("decrypt", Bool(false))],
    },
    CommandDef {
        name: "host.monitoring",
        method: Get,
        params: &[path("id", Int(-1))],
    },
    CommandDef {
        name: "hostpool.info",
        method: Get,
        params: &[],
    },
    CommandDef {
        name: "hostpool.monitoring",
        method: Get,
        params: &[query("seconds", Int(-1))],
    },
];
