//! VM template commands.

use super::HttpMethod::{Delete, Get, Post, Put};
use super::ParamDefault::{Bool, Int, Str};
use super::{body, path, query, CommandDef};

pub const COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: "template.allocate",
        method: Post,
        params: &[body("template", Str(""))],
    },
    CommandDef {
        name: "template.clone",
        method: Post,
        params: &[path("id", Int(-1)), body("name", Str("")), body("image", Bool(false))],
    },
    CommandDef {
        name: "template.delete",
        method: Delete,
        params: &[path("id", Int(-1)), query("image", Bool(false))],
    },
    CommandDef {
        name: "template.instantiate",
        method: Post,
        params: &[
            path("id", Int(-1)),
            body("name", Str("")),
            body("hold", Bool(false)),
            body("template", Str("")),
            body("persistent", Bool(false)),
        ],
    },
    CommandDef {
        name: "template.update",
        method: Put,
        params: &[
            path("id", Int(-1)),
            body("template", Str("")),
            body("replace", Int(0)),
        ],
    },
    CommandDef {
        name: "template.chown",
        method: Put,
        params: &[path("id", Int(-1)), body("user", Int(-1)), body("group", Int(-1))],
    },
    CommandDef {
        name: "template.rename",
        method: Put,
        params: &[path("id", Int(-1)), body("name", Str(""))],
    },
    CommandDef {
        name: "template.info",
        method: Get,
        params: &[
            path("id", Int(-1)),
            query("extended", Bool(false)),
            query("decrypt", Bool(false)),
        ],
    },
    CommandDef {
        name: "templatepool.info",
        method: Get,
        params: &[
            query("filter", Int(-1)),
            query("start", Int(-1)),
            query("end", Int(-1)),
        ],
    },
];
