//! Cluster commands.

use super::HttpMethod::{Delete, Get, Post, Put};
use super::ParamDefault::{Bool, Int, Str};
use super::{body, path, query, CommandDef};

pub const COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: "cluster.allocate",
        method: Post,
        params: &[body("name", Str(""))],
    },
    CommandDef {
        name: "cluster.delete",
        method: Delete,
        params: &[path("id", Int(-1))],
    },
    CommandDef {
        name: "cluster.update",
        method: Put,
        params: &[
            path("id", Int(-1)),
            body("template", Str("")),
            body("replace", Int(0)),
        ],
    },
    CommandDef {
        name: "cluster.addhost",
        method: Put,
        params: &[path("id", Int(-1)), body("host", Int(-1))],
    },
    CommandDef {
        name: "cluster.delhost",
        method: Put,
        params: &[path("id", Int(-1)), body("host", Int(-1))],
    },
    CommandDef {
        name: "cluster.adddatastore",
        method: Put,
        params: &[path("id", Int(-1)), body("datastore", Int(-1))],
    },
    CommandDef {
        name: "cluster.deldatastore",
        method: Put,
        params: &[path("id", Int(-1)), body("datastore", Int(-1))],
    },
    CommandDef {
        name: "cluster.addvnet",
        method: Put,
        params: &[path("id", Int(-1)), body("vnet", Int(-1))],
    },
    CommandDef {
        name: "cluster.delvnet",
        method: Put,
        params: &[path("id", Int(-1)), body("vnet", Int(-1))],
    },
    CommandDef {
        name: "cluster.rename",
        method: Put,
        params: &[path("id", Int(-1)), body("name", Str(""))],
    },
    CommandDef {
        name: "cluster.info",
        method: Get,
        params: &[path("id", Int(-1)), query("decrypt", Bool(false))],
    },
    CommandDef {
        name: "clusterpool.info",
        method: Get,
        params: &[],
    },
];
