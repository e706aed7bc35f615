//! Language registry: one static table drives everything.
//!
//! Keyword lists are comma-separated to keep the table scannable; the
//! matcher splits them on demand. Extending the editor to a new
//! language is one new row.

/// Language selector; also the per-language color-set key in `.cmrc`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LanguageMode {
    #[default]
    None,
    C,
    Cpp,
    Swift,
    Python,
    JavaScript,
    Go,
    Rust,
    Java,
    Shell,
    Makefile,
    Html,
    Css,
    Json,
    Markdown,
}

impl LanguageMode {
    /// Key into the `syntaxColors` config object.
    pub fn key(self) -> &'static str {
        match self {
            LanguageMode::None => "default",
            LanguageMode::C => "c",
            LanguageMode::Cpp => "cpp",
            LanguageMode::Swift => "swift",
            LanguageMode::Python => "python",
            LanguageMode::JavaScript => "javascript",
            LanguageMode::Go => "go",
            LanguageMode::Rust => "rust",
            LanguageMode::Java => "java",
            LanguageMode::Shell => "shell",
            LanguageMode::Makefile => "makefile",
            LanguageMode::Html => "html",
            LanguageMode::Css => "css",
            LanguageMode::Json => "json",
            LanguageMode::Markdown => "markdown",
        }
    }
}

/// Syntax rules for one language.
#[derive(Debug)]
pub struct LanguageSyntax {
    pub mode: LanguageMode,
    pub name: &'static str,
    /// File extensions including the leading dot.
    pub suffixes: &'static [&'static str],
    /// Exact base filenames (Makefile and friends).
    pub filenames: &'static [&'static str],
    pub line_comment: Option<&'static str>,
    pub block_comment: Option<(&'static str, &'static str)>,
    /// Multi-line string delimiter (`"""`, backtick) where the
    /// language has one.
    pub multiline_string: Option<&'static str>,
    /// Block comments nest (Swift, Rust).
    pub nested_block_comments: bool,
    pub keywords: &'static str,
    pub types: &'static str,
    pub constants: &'static str,
}

pub static LANGUAGES: &[LanguageSyntax] = &[
    LanguageSyntax {
        mode: LanguageMode::C,
        name: "C",
        suffixes: &[".c", ".h"],
        filenames: &[],
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        multiline_string: None,
        nested_block_comments: false,
        keywords: "if,else,while,for,do,switch,case,default,break,continue,return,goto,sizeof,typedef,struct,union,enum,extern,static,const,volatile,register,auto,inline",
        types: "int,char,short,long,unsigned,signed,float,double,void,size_t,FILE",
        constants: "NULL,TRUE,FALSE,true,false",
    },
    LanguageSyntax {
        mode: LanguageMode::Cpp,
        name: "C++",
        suffixes: &[".cpp", ".hpp", ".cc", ".cxx", ".hxx", ".C"],
        filenames: &[],
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        multiline_string: None,
        nested_block_comments: false,
        keywords: "if,else,while,for,do,switch,case,default,break,continue,return,goto,sizeof,typedef,struct,union,enum,extern,static,const,volatile,register,auto,inline,class,public,private,protected,virtual,override,final,template,typename,namespace,using,new,delete,try,catch,throw,const_cast,static_cast,dynamic_cast,reinterpret_cast,explicit,friend,mutable,operator,this",
        types: "int,char,short,long,unsigned,signed,float,double,void,bool,size_t,wchar_t",
        constants: "NULL,TRUE,FALSE,true,false,nullptr",
    },
    LanguageSyntax {
        mode: LanguageMode::Swift,
        name: "Swift",
        suffixes: &[".swift"],
        filenames: &[],
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        multiline_string: Some("\"\"\""),
        nested_block_comments: true,
        keywords: "if,else,guard,switch,case,default,for,while,repeat,break,continue,fallthrough,return,throw,throws,rethrows,try,catch,defer,do,import,func,class,struct,enum,protocol,extension,typealias,associatedtype,init,deinit,subscript,convenience,required,override,final,open,public,private,fileprivate,internal,static,mutating,nonmutating,lazy,weak,unowned,inout,let,var,where,is,as,in,self,Self,super,async,await,actor",
        types: "Int,Int8,Int16,Int32,Int64,UInt,UInt8,UInt16,UInt32,UInt64,Float,Double,Bool,String,Character,Array,Dictionary,Set,Optional,Result,Error,Void,Any,AnyObject,Never",
        constants: "nil,true,false",
    },
    LanguageSyntax {
        mode: LanguageMode::Python,
        name: "Python",
        suffixes: &[".py"],
        filenames: &[],
        line_comment: Some("#"),
        block_comment: None,
        multiline_string: Some("\"\"\""),
        nested_block_comments: false,
        keywords: "if,elif,else,while,for,break,continue,return,pass,raise,try,except,finally,with,as,import,from,class,def,lambda,yield,global,nonlocal,assert,del,in,is,not,and,or,async,await",
        types: "int,str,float,bool,list,dict,set,tuple,bytes,type,object",
        constants: "None,True,False",
    },
    LanguageSyntax {
        mode: LanguageMode::JavaScript,
        name: "JavaScript",
        suffixes: &[".js", ".jsx", ".ts", ".tsx"],
        filenames: &[],
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        multiline_string: Some("`"),
        nested_block_comments: false,
        keywords: "if,else,switch,case,default,for,while,do,break,continue,return,throw,try,catch,finally,function,class,extends,new,delete,typeof,instanceof,in,of,let,const,var,import,export,async,await,yield",
        types: "undefined,null,NaN,Infinity",
        constants: "true,false",
    },
    LanguageSyntax {
        mode: LanguageMode::Go,
        name: "Go",
        suffixes: &[".go"],
        filenames: &[],
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        multiline_string: Some("`"),
        nested_block_comments: false,
        keywords: "if,else,switch,case,default,for,range,break,continue,return,go,defer,select,chan,func,type,struct,interface,map,package,import,const,var",
        types: "int,int8,int16,int32,int64,uint,uint8,uint16,uint32,uint64,float32,float64,complex64,complex128,byte,rune,string,bool,error",
        constants: "nil,true,false,iota",
    },
    LanguageSyntax {
        mode: LanguageMode::Rust,
        name: "Rust",
        suffixes: &[".rs"],
        filenames: &[],
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        multiline_string: None,
        nested_block_comments: true,
        keywords: "if,else,match,loop,while,for,in,break,continue,return,fn,let,mut,const,static,type,struct,enum,trait,impl,pub,mod,use,crate,self,super,as,where,async,await,move,dyn,unsafe,extern",
        types: "i8,i16,i32,i64,i128,isize,u8,u16,u32,u64,u128,usize,f32,f64,bool,char,str,String,Vec,Option,Result,Box",
        constants: "true,false,None,Some,Ok,Err",
    },
    LanguageSyntax {
        mode: LanguageMode::Java,
        name: "Java",
        suffixes: &[".java"],
        filenames: &[],
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        multiline_string: None,
        nested_block_comments: false,
        keywords: "if,else,switch,case,default,for,while,do,break,continue,return,throw,throws,try,catch,finally,class,interface,extends,implements,new,instanceof,import,package,public,private,protected,static,final,abstract,synchronized,volatile,transient,native,strictfp,assert,enum,this,super",
        types: "int,long,short,byte,float,double,char,boolean,void,String,Object",
        constants: "true,false,null",
    },
    LanguageSyntax {
        mode: LanguageMode::Shell,
        name: "Shell",
        suffixes: &[".sh", ".bash", ".zsh", ".ksh"],
        filenames: &[],
        line_comment: Some("#"),
        block_comment: None,
        multiline_string: None,
        nested_block_comments: false,
        keywords: "if,then,else,elif,fi,case,esac,for,while,until,do,done,in,function,return,exit,break,continue,local,export,source,alias,unalias,set,unset,shift,trap",
        types: "",
        constants: "true,false",
    },
    LanguageSyntax {
        mode: LanguageMode::Makefile,
        name: "Makefile",
        suffixes: &[".mk", ".mak"],
        filenames: &["Makefile", "makefile", "GNUmakefile"],
        line_comment: Some("#"),
        block_comment: None,
        multiline_string: None,
        nested_block_comments: false,
        keywords: "ifeq,ifneq,ifdef,ifndef,else,endif,define,endef,include,override,export,unexport,vpath",
        types: "",
        constants: "",
    },
    LanguageSyntax {
        mode: LanguageMode::Html,
        name: "HTML",
        suffixes: &[".html", ".htm"],
        filenames: &[],
        line_comment: None,
        block_comment: Some(("<!--", "-->")),
        multiline_string: None,
        nested_block_comments: false,
        keywords: "",
        types: "",
        constants: "",
    },
    LanguageSyntax {
        mode: LanguageMode::Css,
        name: "CSS",
        suffixes: &[".css"],
        filenames: &[],
        line_comment: None,
        block_comment: Some(("/*", "*/")),
        multiline_string: None,
        nested_block_comments: false,
        keywords: "",
        types: "",
        constants: "",
    },
    LanguageSyntax {
        mode: LanguageMode::Json,
        name: "JSON",
        suffixes: &[".json"],
        filenames: &[],
        line_comment: None,
        block_comment: None,
        multiline_string: None,
        nested_block_comments: false,
        keywords: "true,false,null",
        types: "",
        constants: "",
    },
    LanguageSyntax {
        mode: LanguageMode::Markdown,
        name: "Markdown",
        suffixes: &[".md", ".markdown", ".mdown", ".mkd"],
        filenames: &[],
        line_comment: None,
        block_comment: None,
        multiline_string: None,
        nested_block_comments: false,
        keywords: "",
        types: "",
        constants: "",
    },
];

/// Match a file path against the registry: extension first, then exact
/// base filename.
pub fn detect(path: &str) -> Option<&'static LanguageSyntax> {
    if path.is_empty() {
        return None;
    }
    let filename = path.rsplit('/').next().unwrap_or(path);
    let suffix = filename.rfind('.').map(|dot| &filename[dot..]);

    if let Some(suffix) = suffix {
        for lang in LANGUAGES {
            if lang.suffixes.contains(&suffix) {
                return Some(lang);
            }
        }
    }
    for lang in LANGUAGES {
        if lang.filenames.contains(&filename) {
            return Some(lang);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_by_extension() {
        assert_eq!(detect("/src/main.c").unwrap().mode, LanguageMode::C);
        assert_eq!(detect("view.cpp").unwrap().mode, LanguageMode::Cpp);
        assert_eq!(detect("/a/b/lib.rs").unwrap().mode, LanguageMode::Rust);
        assert_eq!(detect("notes.md").unwrap().mode, LanguageMode::Markdown);
    }

    #[test]
    fn detects_makefiles_by_exact_name() {
        assert_eq!(
            detect("/proj/Makefile").unwrap().mode,
            LanguageMode::Makefile
        );
        assert_eq!(detect("GNUmakefile").unwrap().mode, LanguageMode::Makefile);
        assert_eq!(detect("rules.mk").unwrap().mode, LanguageMode::Makefile);
    }

    #[test]
    fn unknown_paths_have_no_language() {
        assert!(detect("").is_none());
        assert!(detect("README").is_none());
        assert!(detect("data.xyz").is_none());
    }

    #[test]
    fn uppercase_c_extension_is_cpp() {
        assert_eq!(detect("legacy.C").unwrap().mode, LanguageMode::Cpp);
    }
}
