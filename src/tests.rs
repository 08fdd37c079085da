//! Cross-module scenarios: MMS notifications and other WAP pushes carried
//! over concatenated 8-bit SMS-DELIVER PDUs, end to end.

use crate::pdu::{decode_sms, DecodedSms, SmsDeliver};
use crate::wap::{extract_wap_push, is_mms_notification, is_wap_push};

fn deliver(pdu: &str) -> SmsDeliver {
    match decode_sms(pdu, true).unwrap() {
        DecodedSms::Deliver(d) => d,
        other => panic!("expected a DELIVER, got {:?}", other)
    }
}
/// Decode each PDU, check its concat bookkeeping, and splice the user data
/// back together in sequence order.
fn reassemble(pdus: &[&str], expected_ref: u16, expected_number: &str) -> Vec<u8> {
    let mut data = vec![];
    for (i, pdu) in pdus.iter().enumerate() {
        let sms = deliver(pdu);
        assert_eq!(sms.number, expected_number);
        let concat = sms.udh.as_ref().unwrap().concat().unwrap();
        assert_eq!(concat.reference, expected_ref);
        assert_eq!(concat.parts as usize, pdus.len());
        assert_eq!(concat.sequence as usize, i + 1);
        data.extend(&sms.user_data);
    }
    data
}

#[test]
fn mms_notification_over_two_sms() {
    let pdus = [
        "0791447758100650400E80885810000000810004016082415464408C0C08049F8E020105040B8423F00106226170706C69636174696F6E2F766E642E7761702E6D6D732D6D65737361676500AF848C82984E4F4B3543694B636F544D595347344D4253774141734B7631344655484141414141414141008D908919802B3434373738353334323734392F545950453D504C4D4E008A808E0274008805810301194083687474703A2F",
        "0791447758100650440E8088581000000081000401608241547440440C08049F8E020205040B8423F02F70726F6D6D732F736572766C6574732F4E4F4B3543694B636F544D595347344D4253774141734B763134465548414141414141414100",
    ];
    let sms = deliver(pdus[0]);
    assert_eq!(sms.csca.as_deref(), Some("+447785016005"));

    let data = reassemble(&pdus, 40846, "88850100000018");
    assert!(is_wap_push(&data));
    let (mms, transaction_id) = extract_wap_push(&data).unwrap();
    assert_eq!(transaction_id, 1);
    assert!(is_mms_notification(&mms));

    assert_eq!(mms.headers.get("Message-Type").unwrap().as_str(),
               Some("m-notification-ind"));
    assert_eq!(mms.headers.get("Transaction-Id").unwrap().as_str(),
               Some("NOK5CiKcoTMYSG4MBSwAAsKv14FUHAAAAAAAA"));
    assert_eq!(mms.headers.get("MMS-Version").unwrap().as_str(), Some("1.0"));
    assert_eq!(mms.headers.get("From").unwrap().as_str(),
               Some("+447785342749/TYPE=PLMN"));
    assert_eq!(mms.headers.get("Message-Class").unwrap().as_str(), Some("Personal"));
    assert_eq!(mms.headers.get("Message-Size").unwrap().as_int(), Some(29696));
    assert_eq!(mms.headers.get("Expiry").unwrap().as_int(), Some(72000));
    assert_eq!(mms.headers.get("Content-Location").unwrap().as_str(),
               Some("http://promms/servlets/NOK5CiKcoTMYSG4MBSwAAsKv14FUHAAAAAAAA"));
    assert!(mms.data_parts().is_empty());
}

#[test]
fn mms_notification_with_longer_expiry() {
    let pdus = [
        "0791447758100650400E80885810000000800004017002314303408C0C0804DFD3020105040B8423F00106226170706C69636174696F6E2F766E642E7761702E6D6D732D6D65737361676500AF848C82984E4F4B3541315A6446544D595347344F3356514141734A763934476F4E4141414141414141008D908919802B3434373731373237353034392F545950453D504C4D4E008A808E0274008805810303F47F83687474703A2F",
        "0791447758100650440E8088581000000080000401700231431340440C0804DFD3020205040B8423F02F70726F6D6D732F736572766C6574732F4E4F4B3541315A6446544D595347344F3356514141734A763934476F4E414141414141414100",
    ];
    let data = reassemble(&pdus, 57299, "88850100000008");
    let (mms, _) = extract_wap_push(&data).unwrap();
    assert!(is_mms_notification(&mms));

    assert_eq!(mms.headers.get("Transaction-Id").unwrap().as_str(),
               Some("NOK5A1ZdFTMYSG4O3VQAAsJv94GoNAAAAAAAA"));
    assert_eq!(mms.headers.get("MMS-Version").unwrap().as_str(), Some("1.0"));
    assert_eq!(mms.headers.get("From").unwrap().as_str(),
               Some("+447717275049/TYPE=PLMN"));
    assert_eq!(mms.headers.get("Message-Class").unwrap().as_str(), Some("Personal"));
    assert_eq!(mms.headers.get("Message-Size").unwrap().as_int(), Some(29696));
    assert_eq!(mms.headers.get("Expiry").unwrap().as_int(), Some(259199));
    assert_eq!(mms.headers.get("Content-Location").unwrap().as_str(),
               Some("http://promms/servlets/NOK5A1ZdFTMYSG4O3VQAAsJv94GoNAAAAAAAA"));
}

#[test]
fn generic_wap_push_is_not_an_mms_notification() {
    let pdus = [
        "0791947122725014440C8500947122921105F5112042519582408C0B05040B8423F0000396020101060B03AE81EAC3958D01A2B48403056A0A20566F6461666F6E650045C60C037761702E6D65696E63616C6C79612E64652F000801035A756D206B6F7374656E6C6F73656E20506F7274616C20224D65696E0083000322202D2065696E66616368206175662064656E20666F6C67656E64656E204C696E6B206B6C69636B656E",
        "0791947122725014440C8500947122921105F5112042519592403C0B05040B8423F00003960202206F6465722064696520536569746520646972656B7420617566727566656E2E2049687200830003205465616D000101",
    ];
    let sms = deliver(pdus[0]);
    assert_eq!(sms.csca.as_deref(), Some("+491722270541"));
    let ports = sms.udh.as_ref().unwrap().ports().unwrap();
    assert_eq!(ports.dest_port, 2948);

    let data = reassemble(&pdus, 150, "004917222911");
    let expected: &[u8] =
        b"\x01\x06\x0b\x03\xae\x81\xea\xc3\x95\x8d\x01\xa2\xb4\x84\x03\x05j\
          \n Vodafone\x00E\xc6\x0c\x03wap.meincallya.de/\x00\x08\x01\x03\
          Zum kostenlosen Portal \"Mein\x00\x83\x00\x03\" - einfach auf den \
          folgenden Link klicken oder die Seite direkt aufrufen. Ihr\x00\x83\
          \x00\x03 Team\x00\x01\x01";
    assert_eq!(data, expected);

    assert!(is_wap_push(&data));
    let (push, _) = extract_wap_push(&data).unwrap();
    assert!(!is_mms_notification(&push));
}
