use std::collections::HashMap;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

/// Upper bound of layers, limited by the width of the layer bitmask.
const MAX_LAYERS: usize = 32;

#[proc_macro_derive(Layer)]
pub fn derive_layer(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let name = &ast.ident;
    let variants = match ast.data {
        Data::Enum(ref data) => data.variants.iter().collect::<Vec<_>>(),
        _ => {
            return syn::Error::new_spanned(name, "Layer can only be derived for enums")
                .to_compile_error()
                .into()
        }
    };
    if variants.is_empty() || variants.len() > MAX_LAYERS {
        let message = format!("Layer: an enum must have 1 to {} variants", MAX_LAYERS);
        return syn::Error::new_spanned(name, message)
            .to_compile_error()
            .into();
    }
    if let Some(v) = variants.iter().find(|v| !matches!(v.fields, Fields::Unit)) {
        return syn::Error::new_spanned(v, "Layer variants must not have fields")
            .to_compile_error()
            .into();
    }

    let paths = variants
        .iter()
        .map(|v| {
            let ident = &v.ident;
            quote!(#name::#ident)
        })
        .collect::<Vec<_>>();
    let arms = paths.iter().enumerate().map(|(i, path)| {
        let i = i as u8;
        quote! {
            #path => #i,
        }
    });

    let expanded = quote! {
        impl rustkbd::keyboard::Layer for #name {
            const LAYERS: &'static [Self] = &[#(#paths),*];

            fn index(&self) -> u8 {
                match self {
                    #(#arms)*
                }
            }
        }
    };

    proc_macro::TokenStream::from(expanded)
}

macro_rules! key {
    ($n:tt, $i:ident) => {
        ($n, quote!(rustkbd::keyboard::Key::$i))
    };
    ($i:ident) => {
        (stringify!($i), quote!(rustkbd::keyboard::Key::$i))
    };
}

fn key_table() -> HashMap<&'static str, TokenStream> {
    [
        key!("", None),
        key!("Trn", Transparent),
        key!(A),
        key!(B),
        key!(C),
        key!(D),
        key!(E),
        key!(F),
        key!(G),
        key!(H),
        key!(I),
        key!(J),
        key!(K),
        key!(L),
        key!(M),
        key!(N),
        key!(O),
        key!(P),
        key!(Q),
        key!(R),
        key!(S),
        key!(T),
        key!(U),
        key!(V),
        key!(W),
        key!(X),
        key!(Y),
        key!(Z),
        key!("1", Digit1_Exclamation),
        key!("2", Digit2_At),
        key!("3", Digit3_Number),
        key!("4", Digit4_Dollar),
        key!("5", Digit5_Percent),
        key!("6", Digit6_Circumflex),
        key!("7", Digit7_Ampersand),
        key!("8", Digit8_Asterisk),
        key!("9", Digit9_LeftParenthesis),
        key!("0", Digit0_RightParenthesis),
        key!(Enter),
        key!("Esc", Escape),
        key!("Bksp", Delete),
        key!(Tab),
        key!(Space),
        key!("-", HyphenMinus_LowLine),
        key!("=", Equal_Plus),
        key!("[", LeftSquareBracket_LeftCurlyBracket),
        key!("]", RightSquareBracket_RightCurlyBracket),
        key!("\\", Backslash_VerticalBar),
        key!("NuBs", NonUs_BackSlash_VerticalBar),
        key!(";", Semicolon_Colon),
        key!("'", Apostrophe_Quotation),
        key!("`", Grave_Tilde),
        key!(",", Comma_LessThan),
        key!(".", Period_GreaterThan),
        key!("/", Slash_Question),
        key!("Caps", CapsLock),
        key!(F1),
        key!(F2),
        key!(F3),
        key!(F4),
        key!(F5),
        key!(F6),
        key!(F7),
        key!(F8),
        key!(F9),
        key!(F10),
        key!(F11),
        key!(F12),
        key!("PrScr", PrintScreen),
        key!("ScLck", ScrollLock),
        key!(Pause),
        key!("Ins", Insert),
        key!(Home),
        key!("PgUp", PageUp),
        key!("DelFw", DeleteForward),
        key!(End),
        key!("PgDn", PageDown),
        key!("Right", RightArrow),
        key!("Left", LeftArrow),
        key!("Down", DownArrow),
        key!("Up", UpArrow),
        key!("NLck", Keypad_NumLock_Clear),
        key!("P/", Keypad_Slash),
        key!("P*", Keypad_Asterisk),
        key!("P-", Keypad_HyphenMinus),
        key!("P+", Keypad_Plus),
        key!("PEnt", Keypad_Enter),
        key!("P1", Keypad_Digit1_End),
        key!("P2", Keypad_Digit2_DownArrow),
        key!("P3", Keypad_Digit3_PageDown),
        key!("P4", Keypad_Digit4_LeftArrow),
        key!("P5", Keypad_Digit5),
        key!("P6", Keypad_Digit6_RightArrow),
        key!("P7", Keypad_Digit7_Home),
        key!("P8", Keypad_Digit8_UpArrow),
        key!("P9", Keypad_Digit9_PageUp),
        key!("P0", Keypad_Digit0_Insert),
        key!("P.", Keypad_Period_Delete),
        key!("P=", Keypad_Equal),
        key!("P,", Keypad_Comma),
        key!("LCtl", LeftControl),
        key!("LSft", LeftShift),
        key!("LAlt", LeftAlt),
        key!("LGui", LeftGui),
        key!("RCtl", RightControl),
        key!("RSft", RightShift),
        key!("RAlt", RightAlt),
        key!("RGui", RightGui),
        key!("RA-W", RightAlt_W),
        key!("RA-P", RightAlt_P),
        key!("RA-Q", RightAlt_Q),
        key!("MPlay", MediaPlay),
        key!("MPau", MediaPause),
        key!("MNext", MediaNextTrack),
        key!("MPrev", MediaPrevTrack),
        key!("MStop", MediaStop),
        key!("MPlPs", MediaPlayPause),
        key!("MMute", MediaMute),
        key!("MVlUp", MediaVolumeIncrement),
        key!("MVlDn", MediaVolumeDecrement),
        key!("BriUp", BrightnessIncrement),
        key!("BriDn", BrightnessDecrement),
        key!("MsUp", MouseUp),
        key!("MsDn", MouseDown),
        key!("MsLt", MouseLeft),
        key!("MsRt", MouseRight),
        key!("Btn1", MouseButton1),
        key!("Btn2", MouseButton2),
        key!("Btn3", MouseButton3),
        key!("WhUp", MouseWheelUp),
        key!("WhDn", MouseWheelDown),
        key!("WhLt", MouseWheelLeft),
        key!("WhRt", MouseWheelRight),
        key!("Acl0", MouseAccel0),
        key!("Acl1", MouseAccel1),
        key!("Acl2", MouseAccel2),
        key!("AuOn", AudioOn),
        key!("AuOff", AudioOff),
        key!("MuOn", MusicOn),
        key!("MuOff", MusicOff),
        key!("MuMod", MusicModeNext),
        key!("MuvIn", VoiceIncrement),
        key!("MuvDe", VoiceDecrement),
        key!("Reset", Bootloader),
        key!("~", Tilde),
        key!("!", Exclamation),
        key!("@", At),
        key!("#", Hash),
        key!("$", Dollar),
        key!("%", Percent),
        key!("^", Circumflex),
        key!("&", Ampersand),
        key!("*", Asterisk),
        key!("(", LeftParenthesis),
        key!(")", RightParenthesis),
        key!("_", LowLine),
        key!("+", Plus),
        key!("{", LeftCurlyBracket),
        key!("}", RightCurlyBracket),
        key!("Pipe", VerticalBar),
        key!(":", Colon),
        key!("\"", Quotation),
        key!("<", LessThan),
        key!(">", GreaterThan),
        key!("?", Question),
    ]
    .into_iter()
    .collect::<HashMap<_, _>>()
}

fn unknown(kind: &str, symbol: &str) -> TokenStream {
    let message = format!("layout: Unknown {}: {}", kind, symbol);
    quote!(compile_error!(#message))
}

fn action(symbol: &str, table: &HashMap<&'static str, TokenStream>) -> TokenStream {
    if let Some(key) = table.get(symbol) {
        return quote!(rustkbd::keyboard::Action::Key(#key));
    }
    // `@Expr` is a keymap-defined keycode
    if let Some(custom) = symbol.strip_prefix('@') {
        return match syn::parse_str::<syn::Expr>(custom) {
            Ok(expr) => quote!(rustkbd::keyboard::Action::Custom(#expr)),
            Err(_) => unknown("custom key", custom),
        };
    }
    // `LT(Layer,Key)` is a layer-tap
    if let Some(args) = symbol
        .strip_prefix("LT(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let Some((layer, key)) = args.split_once(',') else {
            return unknown("layer-tap", symbol);
        };
        let Ok(layer) = syn::parse_str::<syn::Expr>(layer.trim()) else {
            return unknown("layer", layer);
        };
        return match table.get(key.trim()) {
            Some(key) => quote!(rustkbd::keyboard::Action::LayerTap(#layer, #key)),
            None => unknown("symbol", key),
        };
    }
    unknown("symbol", symbol)
}

#[proc_macro]
pub fn layout(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as LitStr).value();
    let table = key_table();

    let array = input
        .trim()
        .lines()
        .map(&str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let array = line
                .split('|')
                .map(&str::trim)
                .collect::<Vec<_>>()
                .into_iter()
                .skip(1)
                .rev()
                .skip(1)
                .rev()
                .map(|k| action(k, &table))
                .map(|t| quote! {#t,})
                .collect::<TokenStream>();
            quote! {
                [#array]
            }
        })
        .map(|t| quote! {#t,})
        .collect::<TokenStream>();

    let expanded = quote! {
        [#array]
    };

    proc_macro::TokenStream::from(expanded)
}
