//! Virtual network commands.

use super::HttpMethod::{Delete, Get, Post, Put};
use super::ParamDefault::{Bool, Int, Str};
use super::{body, path, query, CommandDef};

pub const COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: "vn.allocate",
        method: Post,
        params: &[body("template", Str("")), body("cluster", Int(-1))],
    },
    CommandDef {
        name: "vn.delete",
        method: Delete,
        params: &[path("id", Int(-1))],
    },
    CommandDef {
        name: "vn.add_ar",
        method: Put,
        params: &[path("id", Int(-1)), body("template", Str(""))],
    },
    CommandDef {
        name: "vn.rm_ar",
        method: Put,
        params: &[path("id", Int(-1)), body("address", Int(-1))],
    },
    CommandDef {
        name: "vn.update_ar",
        method: Put,
        params: &[path("id", Int(-1)), body("template", Str(""))],
    },
    CommandDef {
        name: "vn.reserve",
        method: Put,
        params: &[path("id", Int(-1)), body("template", Str(""))],
    },
    CommandDef {
        name: "vn.hold",
        method: Put,
        params: &[path("id", Int(-1)), body("template", Str(""))],
    },
    CommandDef {
        name: "vn.release",
        method: Put,
        params: &[path("id", Int(-1)), body("template", Str(""))],
    },
    CommandDef {
        name: "vn.update",
        method: Put,
        params: &[
            path("id", Int(-1)),
            body("template", Str("")),
            body("replace", Int(0)),
        ],
    },
    CommandDef {
        name: "vn.chown",
        method: Put,
        params: &[path("id", Int(-1)), body("user", Int(-1)), body("group", Int(-1))],
    },
    CommandDef {
        name: "vn.rename",
        method: Put,
        params: &[path("id", Int(-1)), body("name", Str(""))],
    },
    CommandDef {
        name: "vn.info",
        method: Get,
        params: &[path("id", Int(-1)), query("decrypt", Bool(false))],
    },
    CommandDef {
        name: "vnpool.info",
        method: Get,
        params: &[
            query("filter", Int(-1)),
            query("start", Int(-1)),
            query("end", Int(-1)),
        ],
    },
];
