use clap::ValueEnum;

/// Language of the user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Locale {
    #[default]
    #[value(name = "en")]
    En,
    #[value(name = "zh")]
    ZhCn,
}

/// Variables consulted in order; the first non-empty one decides.
const LOCALE_VARS: [&str; 4] = ["LANG", "LANGUAGE", "LC_ALL", "LC_MESSAGES"];

impl Locale {
    pub fn detect() -> Self {
        Self::detect_with(|key| std::env::var(key).ok())
    }

    pub fn detect_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lang = LOCALE_VARS
            .iter()
            .filter_map(|&key| lookup(key))
            .find(|value| !value.is_empty());

        match lang.as_deref() {
            Some("zh_CN.UTF-8") => Locale::ZhCn,
            _ => Locale::En,
        }
    }

    pub fn messages(self) -> &'static Messages {
        Messages::for_locale(self)
    }
}

/// Fixed strings shown by the CLI.
#[derive(Debug)]
pub struct Messages {
    pub warn_no_port: &'static str,
    pub warn_no_match: &'static str,
    pub miss_args: &'static str,
    pub result: &'static str,
    pub kill_process: &'static str,
    pub item_kill: &'static str,
    pub item_fuzzy: &'static str,
}

static EN: Messages = Messages {
    warn_no_port: "specify the port please",
    warn_no_match: "No process bound to the specified port(s)",
    miss_args: "Miss arguments:",
    result: "The search result is:",
    kill_process: "Now will kill the corresponding process(es):",
    item_kill: "whether to kill process",
    item_fuzzy: "match the port fuzzily",
};

static ZH_CN: Messages = Messages {
    warn_no_port: "请指定端口",
    warn_no_match: "指定端口无进程监听",
    miss_args: "缺少参数：",
    result: "端口匹配结果如下：",
    kill_process: "结束以下进程：",
    item_kill: "是否自动杀死对应进程",
    item_fuzzy: "是否模糊匹配端口",
};

impl Messages {
    pub fn for_locale(locale: Locale) -> &'static Self {
        match locale {
            Locale::En => &EN,
            Locale::ZhCn => &ZH_CN,
        }
    }
}
