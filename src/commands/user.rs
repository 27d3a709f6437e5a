//! User commands. Login is handled by the auth subsystem, not dispatched.

use super::HttpMethod::{Delete, Get, Post, Put};
use super::ParamDefault::{Bool, Int, Str};
use super::{body, path, query, CommandDef};

pub const COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: "user.allocate",
        method: Post,
        params: &[
            body("username", Str("")),
            body("password", Str("")),
            body("driver", Str("")),
        ],
    },
    CommandDef {
        name: "user.delete",
        method: Delete,
        params: &[path("id", Int(-1))],
    },
    CommandDef {
        name: "user.passwd",
        method: Put,
        params: &[path("id", Int(-1)), body("password", Str(""))],
    },
    CommandDef {
        name: "user.update",
        method: Put,
        params: &[
            path("id", Int(-1)),
            body("template", Str("")),
            body("replace", Int(0)),
        ],
    },
    CommandDef {
        name: "user.chgrp",
        method: Put,
        params: &[path("id", Int(-1)), body("group", Int(-1))],
    },
    CommandDef {
        name: "user.info",
        method: Get,
        params: &[path("id", Int(-1)), query("decrypt", Bool(false))],
    },
    CommandDef {
        name: "userpool.info",
        method: Get,
        params: &[],
    },
];
