//! Static profile content shown by the built-in commands.

pub const ABOUT: &str = "I'm a passionate developer who loves creating unique web experiences! \
Check out my projects and skills for more info.";

pub const SKILLS: &[&str] = &[
    "JavaScript",
    "TypeScript",
    "React",
    "Node.js",
    "Python",
    "And more!",
];

pub struct Social {
    pub network: &'static str,
    pub handle: &'static str,
    pub url: &'static str,
}

pub const SOCIALS: &[Social] = &[
    Social {
        network: "GitHub",
        handle: "@trixzyy",
        url: "https://github.com/trixzyy",
    },
    Social {
        network: "Twitter",
        handle: "@trixzydev",
        url: "https://twitter.com/trixzydev",
    },
    Social {
        network: "Discord",
        handle: "@trixzy",
        url: "https://discord.com/users/992171799536218142",
    },
];

pub const CONTACT: &str = "@trixzy on Discord";

pub const PROMPT: &str = "visitor@lookout:~$ ";

pub const BANNER: &str = r#" /\_/\
( o.o )
 > ^ <
  _                 _               _
 | | ___   ___  | | _____  _   _| |_
 | |/ _ \ / _ \ | |/ / _ \| | | | __|
 | | (_) | (_) ||   < (_) | |_| | |_
 |_|\___/ \___/ |_|\_\___/ \__,_|\__|
"#;
